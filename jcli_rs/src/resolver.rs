//! Trie resolver over space-delimited pattern words.
//!
//! Each pattern alternative is a path of words; the deepest node carrying a
//! descriptor that prefixes the input wins (longest match). Children keep
//! insertion order so candidate listings and completions are deterministic,
//! and the first descriptor registered for a path is never displaced.

use std::sync::Arc;

use crate::command::CommandDescriptor;
use crate::token::{ArgumentToken, TokenStream};

/// One node of the pattern trie. The root carries an empty word.
pub struct TrieNode {
    word: String,
    children: Vec<TrieNode>,
    descriptor: Option<Arc<CommandDescriptor>>,
}

/// Outcome of matching a token stream against the trie.
pub enum Resolution<'r> {
    /// A descriptor matched; the stream is advanced past its pattern words.
    Full {
        descriptor: Arc<CommandDescriptor>,
        node: &'r TrieNode,
    },
    /// One or more words descended into the trie without reaching a
    /// descriptor. The stream is rewound; `node` is the deepest match.
    Partial { node: &'r TrieNode },
    /// The first word matched nothing. The stream is untouched.
    NoMatch,
}

impl TrieNode {
    pub(crate) fn root() -> Self {
        TrieNode {
            word: String::new(),
            children: Vec::new(),
            descriptor: None,
        }
    }

    /// The word this node matches.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Immediate child words, in registration order.
    pub fn child_words(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.word.as_str()).collect()
    }

    /// Every descriptor reachable at or beneath this node, deduplicated
    /// (one command may own several alternatives under the same prefix),
    /// in registration order.
    pub fn descriptors_beneath(&self) -> Vec<Arc<CommandDescriptor>> {
        let mut out: Vec<Arc<CommandDescriptor>> = Vec::new();
        self.collect_descriptors(&mut out);
        out
    }

    fn collect_descriptors(&self, out: &mut Vec<Arc<CommandDescriptor>>) {
        if let Some(descriptor) = &self.descriptor
            && !out.iter().any(|seen| Arc::ptr_eq(seen, descriptor))
        {
            out.push(descriptor.clone());
        }
        for child in &self.children {
            child.collect_descriptors(out);
        }
    }

    /// Register one pattern alternative. Identical paths keep the first
    /// descriptor: resolution ties break by registration order, decided
    /// here once, never re-derived per call.
    pub(crate) fn define(&mut self, alternative: &str, descriptor: Arc<CommandDescriptor>) {
        let mut node = self;
        for word in alternative.split_whitespace() {
            let idx = match node.children.iter().position(|c| c.word == word) {
                Some(idx) => idx,
                None => {
                    node.children.push(TrieNode {
                        word: word.to_string(),
                        children: Vec::new(),
                        descriptor: None,
                    });
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
        }
        if node.descriptor.is_none() {
            node.descriptor = Some(descriptor);
        }
    }

    /// Match-and-advance: descend while leading text tokens name children,
    /// remembering the deepest node that carries a descriptor. On a full
    /// match the stream ends up just past the matched words; otherwise it is
    /// rewound to where it started.
    pub fn resolve_and_advance<'r>(&'r self, stream: &mut TokenStream) -> Resolution<'r> {
        let start = stream.snapshot();
        let mut node = self;
        let mut best: Option<(&'r TrieNode, usize)> = None;
        let mut descended = false;

        while let ArgumentToken::Text(word) = stream.peek() {
            let Some(child) = node.children.iter().find(|c| c.word == word) else {
                break;
            };
            stream.advance();
            descended = true;
            node = child;
            if node.descriptor.is_some() {
                best = Some((node, stream.snapshot()));
            }
        }

        match best {
            Some((matched, mark)) => {
                stream.restore(mark);
                let descriptor = matched
                    .descriptor
                    .clone()
                    .expect("best node recorded without descriptor");
                Resolution::Full {
                    descriptor,
                    node: matched,
                }
            }
            None if descended => {
                stream.restore(start);
                Resolution::Partial { node }
            }
            None => {
                stream.restore(start);
                Resolution::NoMatch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandModel;

    fn descriptor(pattern: &str) -> Arc<CommandDescriptor> {
        #[derive(Default)]
        struct Noop;
        Arc::new(
            CommandModel::<Noop>::new(pattern, "test")
                .run(|_| ())
                .into_descriptor()
                .unwrap(),
        )
    }

    fn stream(words: &[&str]) -> TokenStream {
        TokenStream::new(words.iter().map(|w| w.to_string()).collect())
    }

    fn trie(patterns: &[&str]) -> TrieNode {
        let mut root = TrieNode::root();
        for pattern in patterns {
            let d = descriptor(pattern);
            for alt in pattern.split('|') {
                root.define(alt, d.clone());
            }
        }
        root
    }

    #[test]
    fn test_longest_match_wins() {
        let root = trie(&["e", "e test", "et"]);
        let mut s = stream(&["e", "test", "x"]);
        match root.resolve_and_advance(&mut s) {
            Resolution::Full { descriptor, .. } => {
                assert_eq!(descriptor.pattern, "e test");
            }
            _ => panic!("expected full match"),
        }
        assert_eq!(s.raw_tail(), &["x"]);
    }

    #[test]
    fn test_shorter_alternative_still_matches() {
        let root = trie(&["e", "e test", "et"]);
        let mut s = stream(&["e", "other"]);
        match root.resolve_and_advance(&mut s) {
            Resolution::Full { descriptor, .. } => assert_eq!(descriptor.pattern, "e"),
            _ => panic!("expected full match on 'e'"),
        }
        assert_eq!(s.raw_tail(), &["other"]);
    }

    #[test]
    fn test_flag_token_stops_descent() {
        let root = trie(&["e", "e test"]);
        let mut s = stream(&["e", "--help", "test"]);
        match root.resolve_and_advance(&mut s) {
            Resolution::Full { descriptor, .. } => assert_eq!(descriptor.pattern, "e"),
            _ => panic!("expected full match on 'e'"),
        }
        assert_eq!(s.raw_tail(), &["--help", "test"]);
    }

    #[test]
    fn test_partial_prefix_rewinds() {
        let root = trie(&["snapshot save"]);
        let mut s = stream(&["snapshot", "delete"]);
        match root.resolve_and_advance(&mut s) {
            Resolution::Partial { node } => {
                assert_eq!(node.word(), "snapshot");
                assert_eq!(node.child_words(), ["save"]);
            }
            _ => panic!("expected partial match"),
        }
        assert_eq!(s.raw_tail(), &["snapshot", "delete"]);
    }

    #[test]
    fn test_no_match_leaves_stream_untouched() {
        let root = trie(&["run"]);
        let mut s = stream(&["nope"]);
        assert!(matches!(root.resolve_and_advance(&mut s), Resolution::NoMatch));
        assert_eq!(s.raw_tail(), &["nope"]);
    }

    #[test]
    fn test_first_registration_wins_on_identical_paths() {
        let mut root = TrieNode::root();
        let first = descriptor("dup");
        let second = descriptor("dup");
        root.define("dup", first.clone());
        root.define("dup", second);
        let mut s = stream(&["dup"]);
        match root.resolve_and_advance(&mut s) {
            Resolution::Full { descriptor, .. } => assert!(Arc::ptr_eq(&descriptor, &first)),
            _ => panic!("expected full match"),
        }
    }

    #[test]
    fn test_child_words_keep_registration_order() {
        let root = trie(&["b", "a", "c"]);
        assert_eq!(root.child_words(), ["b", "a", "c"]);
    }

    #[test]
    fn test_descriptors_beneath_deduplicates_alternatives() {
        let mut root = TrieNode::root();
        let d = descriptor("run all|run");
        root.define("run all", d.clone());
        root.define("run", d);
        let beneath = root.descriptors_beneath();
        assert_eq!(beneath.len(), 1);
    }
}
