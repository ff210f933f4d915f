//! Classified token stream over raw argument words.
//!
//! The stream is the single input surface of the dispatch pipeline: the
//! resolver consumes leading command-name tokens from it, the binding loop
//! consumes the rest. It is restartable and snapshot-able so resolution can
//! back out of a partial descent, and it exposes the unconsumed raw tail for
//! verbatim capture after the `---` separator.

/// One classified argument token.
///
/// Classification happens lazily on access; the underlying words are never
/// mutated, so rewinding a stream re-yields identical tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentToken {
    /// Plain positional text (also: values, command-name words).
    Text(String),
    /// Double-dash form: `--verbose` yields `LongHand("verbose")`.
    /// The `---` separator yields `LongHand("-")`.
    LongHand(String),
    /// Single-dash form: `-v` yields `ShortHand("v")`.
    ShortHand(String),
    /// End of input.
    Eof,
}

/// Restartable, snapshot-able sequence of classified tokens.
#[derive(Debug, Clone)]
pub struct TokenStream {
    words: Vec<String>,
    pos: usize,
}

impl TokenStream {
    pub fn new(words: Vec<String>) -> Self {
        TokenStream { words, pos: 0 }
    }

    /// Classify a single word without consuming anything.
    pub fn classify(word: &str) -> ArgumentToken {
        if let Some(rest) = word.strip_prefix("--") {
            ArgumentToken::LongHand(rest.to_string())
        } else if let Some(rest) = word.strip_prefix('-') {
            if rest.is_empty() {
                // A lone dash is data (stdin convention), not a flag.
                ArgumentToken::Text(word.to_string())
            } else {
                ArgumentToken::ShortHand(rest.to_string())
            }
        } else {
            ArgumentToken::Text(word.to_string())
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> ArgumentToken {
        match self.words.get(self.pos) {
            Some(word) => Self::classify(word),
            None => ArgumentToken::Eof,
        }
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> ArgumentToken {
        let token = self.peek();
        if self.pos < self.words.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume the next word and return it verbatim, unclassified.
    pub fn advance_word(&mut self) -> Option<&str> {
        let word = self.words.get(self.pos)?;
        self.pos += 1;
        Some(word)
    }

    /// Position marker for later [`TokenStream::restore`].
    pub fn snapshot(&self) -> usize {
        self.pos
    }

    /// Rewind (or fast-forward) to a previously taken snapshot.
    pub fn restore(&mut self, mark: usize) {
        self.pos = mark.min(self.words.len());
    }

    /// Rewind to the first word.
    pub fn restart(&mut self) {
        self.pos = 0;
    }

    /// The unconsumed words, verbatim.
    pub fn raw_tail(&self) -> &[String] {
        &self.words[self.pos..]
    }

    /// Consume every remaining word and return them verbatim.
    pub fn take_raw_tail(&mut self) -> Vec<String> {
        let tail = self.words[self.pos..].to_vec();
        self.pos = self.words.len();
        tail
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.words.len()
    }
}
