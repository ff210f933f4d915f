//! Shell completion: the query algorithm and the script template.
//!
//! A query arrives as `[cursorIndex, exeName, word0, word1, …]`. Words before
//! the cursor are resolved against the pattern trie: without a full match the
//! suggestions are child command-words of the deepest matched node; with a
//! full match they are the command's unused named-argument aliases. The reply
//! is a single space-separated, trailing-space-terminated line on stdout. A
//! malformed query prints nothing — completion must never error into the
//! user's shell.

use std::collections::HashSet;

use crate::command::{CommandDescriptor, flag_display};
use crate::dispatch::Cli;
use crate::resolver::Resolution;
use crate::token::{ArgumentToken, TokenStream};

const BASH_COMPLETION_TEMPLATE: &str = r#"# bash completion script for {name}
_{name}_complete() {
    local response
    response="$('{path}' '__jcli:complete' "${COMP_CWORD}" "${COMP_WORDS[@]}")"
    local IFS=$' \t\n'
    COMPREPLY=()
    local word
    for word in ${response}; do
        COMPREPLY+=("${word}")
    done
    return 0
}
complete -F _{name}_complete '{name}'
"#;

/// Answer one completion query. Always returns 0.
pub(crate) fn run_query(cli: &Cli, args: &[String]) -> i32 {
    if let Some(line) = completion_line(cli, args) {
        println!("{line}");
    }
    0
}

/// Emit the completion script for the running executable. Always returns 0.
pub(crate) fn emit_script() -> i32 {
    let exe = std::env::current_exe().ok();
    let path = exe
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| std::env::args().next().unwrap_or_default());
    let name = exe
        .as_ref()
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("command")
        .to_string();
    print!("{}", completion_script(&name, &path));
    0
}

pub(crate) fn completion_script(name: &str, path: &str) -> String {
    BASH_COMPLETION_TEMPLATE
        .replace("{name}", name)
        .replace("{path}", path)
}

/// The suggestion line for one query, trailing space included, or `None`
/// when there is nothing to propose (or the query is malformed).
pub(crate) fn completion_line(cli: &Cli, args: &[String]) -> Option<String> {
    let cursor: usize = args.first()?.parse().ok()?;
    let words: &[String] = args.get(2..).unwrap_or(&[]);
    // The shell counts the executable word; re-base over the remaining words.
    let cursor = cursor.saturating_sub(1);

    let before: Vec<String> = words.iter().take(cursor).cloned().collect();
    let current: String = words.get(cursor).cloned().unwrap_or_default();
    let after: Vec<String> = words.iter().skip(cursor + 1).cloned().collect();

    let mut stream = TokenStream::new(before);
    let suggestions = match cli.registry().root().resolve_and_advance(&mut stream) {
        Resolution::Full { descriptor, .. } => {
            let rest = stream.take_raw_tail();
            command_suggestions(&descriptor, &rest, &current, &after)
        }
        Resolution::Partial { node } => word_suggestions(node.child_words(), &current),
        Resolution::NoMatch => word_suggestions(cli.registry().root().child_words(), &current),
    };
    if suggestions.is_empty() {
        return None;
    }

    let mut line = String::new();
    for suggestion in &suggestions {
        line.push_str(suggestion);
        line.push(' ');
    }
    Some(line)
}

fn word_suggestions(words: Vec<&str>, current: &str) -> Vec<String> {
    words
        .into_iter()
        .filter(|w| w.starts_with(current))
        .map(str::to_string)
        .collect()
}

/// Suggestions inside a fully matched command: the default behavior unless
/// the model installed a custom completion closure.
fn command_suggestions(
    descriptor: &CommandDescriptor,
    before: &[String],
    current: &str,
    after: &[String],
) -> Vec<String> {
    if let Some(custom) = &descriptor.complete_override {
        return custom(before, current, after);
    }

    // Inside the raw tail nothing is completable.
    if before.iter().any(|w| w == "--" || w == "---") {
        return Vec::new();
    }

    // Value position after a non-boolean flag: value completion unsupported.
    if let Some(last) = before.last()
        && let Some(index) = flag_spec_index(descriptor, last)
        && !descriptor.named[index].boolean
    {
        return Vec::new();
    }

    let mut used: HashSet<usize> = HashSet::new();
    for word in before.iter().chain(after.iter()) {
        if let Some(index) = flag_spec_index(descriptor, word) {
            used.insert(index);
        }
    }

    let mut out = Vec::new();
    for (index, spec) in descriptor.named.iter().enumerate() {
        if used.contains(&index) {
            continue;
        }
        for alias in &spec.aliases {
            let rendered = flag_display(alias);
            if rendered.starts_with(current) {
                out.push(rendered);
            }
        }
    }
    out
}

fn flag_spec_index(descriptor: &CommandDescriptor, word: &str) -> Option<usize> {
    match TokenStream::classify(word) {
        ArgumentToken::ShortHand(name) => descriptor.find_named(&name, true),
        ArgumentToken::LongHand(name) => descriptor.find_named(&name, false),
        _ => None,
    }
}
