//! The dispatch pipeline: mode detection, resolution, decision, execution.
//!
//! ```text
//! argv ──► TokenStream ──► Resolver ──► Decide ──► Binding loop ──► execute
//!              │               │           │
//!              │               │           ├─ help flag → help text
//!              │               │           └─ no match  → default command
//!              │               │                          or candidates
//!              │               └─ "__jcli:complete" → completion query
//!              └─ "__jcli:bash_complete_script" → script emission
//! ```
//!
//! One call fully resolves, binds, and executes before returning; every
//! failure is caught here, rendered as `ERROR: <message>`, and mapped to
//! status -1. The registry and the service container are the only shared
//! state, so calls may run concurrently and a command may re-enter
//! [`Cli::dispatch`] recursively.

mod bind;
mod complete;

use tracing::debug;

use crate::command::CommandDescriptor;
use crate::error::InvokeError;
use crate::help::{render_command_help, render_command_listing};
use crate::registry::CommandRegistry;
use crate::resolver::{Resolution, TrieNode};
use crate::scope::Services;
use crate::token::{ArgumentToken, TokenStream};

/// First-token sentinel for shell completion queries.
pub const COMPLETE_SENTINEL: &str = "__jcli:complete";
/// First-token sentinel for completion-script emission.
pub const SCRIPT_SENTINEL: &str = "__jcli:bash_complete_script";

/// Top-level entry point: an immutable registry plus the service container,
/// shared across calls.
pub struct Cli {
    registry: CommandRegistry,
    services: Services,
}

impl Cli {
    pub fn new(registry: CommandRegistry) -> Self {
        Cli {
            registry,
            services: Services::new(),
        }
    }

    pub fn with_services(registry: CommandRegistry, services: Services) -> Self {
        Cli { registry, services }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Dispatch the process arguments, dropping the program path.
    pub fn run(&self) -> i32 {
        let args: Vec<String> = std::env::args().skip(1).collect();
        self.dispatch(&args)
    }

    /// Dispatch an argument vector verbatim (no program path expected).
    pub fn dispatch(&self, args: &[String]) -> i32 {
        match args.first().map(String::as_str) {
            Some(COMPLETE_SENTINEL) => {
                debug!("completion query mode");
                complete::run_query(self, &args[1..])
            }
            Some(SCRIPT_SENTINEL) => {
                debug!("completion script mode");
                complete::emit_script()
            }
            _ => self.execute_mode(args),
        }
    }

    fn execute_mode(&self, args: &[String]) -> i32 {
        let mut stream = TokenStream::new(args.to_vec());
        match self.registry.root().resolve_and_advance(&mut stream) {
            Resolution::Full { descriptor, .. } => {
                debug!(command = descriptor.display_name(), "resolved");
                self.invoke(&descriptor, &mut stream)
            }
            Resolution::Partial { node } => self.unresolved(&mut stream, Some(node)),
            Resolution::NoMatch => self.unresolved(&mut stream, None),
        }
    }

    /// Nothing fully matched: help, default command, or unknown-command
    /// error, in that order. The stream sits at its start.
    fn unresolved(&self, stream: &mut TokenStream, deepest: Option<&TrieNode>) -> i32 {
        let scope_node = deepest.unwrap_or_else(|| self.registry.root());

        if has_help_flag(stream.raw_tail()) {
            let mut text = String::new();
            if let Some(default) = self.registry.default_command() {
                text.push_str(&render_command_help(default));
                text.push('\n');
            }
            text.push_str(&render_command_listing(&scope_node.descriptors_beneath()));
            print!("{text}");
            return 0;
        }

        if let Some(default) = self.registry.default_command() {
            debug!("falling back to default command");
            stream.restart();
            return self.invoke(default, stream);
        }

        let attempted = attempted_prefix(stream.raw_tail());
        let error = InvokeError::UnknownCommand {
            attempted: attempted.clone(),
        };
        eprintln!("ERROR: {error}");
        if let Some(suggestion) = self.suggest_similar(&attempted) {
            eprintln!("Did you mean '{suggestion}'?");
        }
        eprint!(
            "{}",
            render_command_listing(&scope_node.descriptors_beneath())
        );
        -1
    }

    /// Bind and execute one resolved command. The service scope lives for
    /// exactly this call and is dropped on every exit path.
    fn invoke(&self, descriptor: &CommandDescriptor, stream: &mut TokenStream) -> i32 {
        let scope = self.services.scope();
        let mut instance = (descriptor.construct)(&scope);

        if has_help_flag(stream.raw_tail()) {
            print!("{}", render_command_help(descriptor));
            return 0;
        }

        debug!(command = descriptor.display_name(), "binding arguments");
        if let Err(error) = bind::bind_arguments(descriptor, instance.as_mut(), stream) {
            eprintln!("ERROR: {error}");
            return -1;
        }

        debug!(command = descriptor.display_name(), "executing");
        match (descriptor.execute)(instance.as_mut()) {
            Ok(status) => status,
            Err(source) => {
                if cfg!(debug_assertions) {
                    debug!(chain = ?source, "execute body failed");
                }
                let error = InvokeError::UnhandledExecutionFailure {
                    message: source.to_string(),
                };
                eprintln!("ERROR: {error}");
                -1
            }
        }
    }

    /// Nearest registered top-level word by edit distance, for the
    /// unknown-command message.
    fn suggest_similar(&self, attempted: &str) -> Option<String> {
        let first = attempted.split_whitespace().next()?;
        let mut best: Option<(&str, usize)> = None;
        for word in self.registry.root().child_words() {
            let distance = strsim::levenshtein(first, word);
            if distance <= 2 && best.is_none_or(|(_, d)| distance < d) {
                best = Some((word, distance));
            }
        }
        best.map(|(word, _)| word.to_string())
    }
}

fn has_help_flag(words: &[String]) -> bool {
    words.iter().any(|w| w == "-h" || w == "--help")
}

/// The leading command-path words of an unresolved input: everything up to
/// the first flag token.
fn attempted_prefix(words: &[String]) -> String {
    words
        .iter()
        .take_while(|w| matches!(TokenStream::classify(w), ArgumentToken::Text(_)))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::command::CommandModel;
    use crate::registry::CommandRegistry;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[derive(Clone, Default)]
    struct Recorded {
        a: Option<u32>,
        first: Option<String>,
        var: Option<String>,
        flag: Option<bool>,
        rest: Vec<String>,
    }

    type Log = Arc<Mutex<Vec<Recorded>>>;

    /// Registry mirroring the multi-alternative layout: one command under
    /// several patterns, recording every bound instance it executes.
    fn recording_cli(patterns: &str, with_default: bool, log: &Log) -> Cli {
        #[derive(Default)]
        struct Probe {
            a: Option<u32>,
            first: Option<String>,
            flag: Option<bool>,
            rest: Vec<String>,
        }
        #[derive(Default)]
        struct Fallback {
            var: Option<String>,
        }

        let seen = log.clone();
        let mut builder = CommandRegistry::builder().command(
            CommandModel::<Probe>::new(patterns, "probe")
                .named(&["a"], "a value", |c| &mut c.a)
                .named(&["x", "flag"], "a boolean", |c| &mut c.flag)
                .positional("first", "first positional", |c| &mut c.first)
                .raw_args(|c| &mut c.rest)
                .run(move |c| {
                    seen.lock().unwrap().push(Recorded {
                        a: c.a,
                        first: c.first.clone(),
                        var: None,
                        flag: c.flag,
                        rest: c.rest.clone(),
                    });
                }),
        );
        if with_default {
            let seen = log.clone();
            builder = builder.command(
                CommandModel::<Fallback>::new("", "fallback")
                    .named(&["var"], "a variable", |c| &mut c.var)
                    .run(move |c| {
                        seen.lock().unwrap().push(Recorded {
                            var: c.var.clone(),
                            ..Default::default()
                        });
                    }),
            );
        }
        Cli::new(builder.build().unwrap())
    }

    #[test]
    fn test_multi_alternative_binding_before_execute() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("execute t|execute test|et|e test", false, &log);
        let status = cli.dispatch(&args(&["et", "20", "-a", "20"]));
        assert_eq!(status, 0);
        let seen = log.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].a, Some(20));
        assert_eq!(seen[0].first.as_deref(), Some("20"));
    }

    #[test]
    fn test_longest_alternative_preferred() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("e|e test|et", false, &log);
        let status = cli.dispatch(&args(&["e", "test", "x"]));
        assert_eq!(status, 0);
        // "e test" consumed both words, so "x" is the first positional.
        assert_eq!(log.lock().unwrap()[0].first.as_deref(), Some("x"));
    }

    #[test]
    fn test_default_command_takes_unmatched_stream() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", true, &log);
        let status = cli.dispatch(&args(&["--var", "2"]));
        assert_eq!(status, 0);
        assert_eq!(log.lock().unwrap()[0].var.as_deref(), Some("2"));
    }

    #[test]
    fn test_empty_input_without_default_fails() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", false, &log);
        assert_eq!(cli.dispatch(&[]), -1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_input_with_default_runs_it() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", true, &log);
        assert_eq!(cli.dispatch(&[]), 0);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_command_without_default_fails() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", false, &log);
        assert_eq!(cli.dispatch(&args(&["rnu"])), -1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_boolean_flag_variants() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", false, &log);

        assert_eq!(cli.dispatch(&args(&["run", "-x", "pos"])), 0);
        assert_eq!(cli.dispatch(&args(&["run", "-x", "false", "pos"])), 0);
        assert_eq!(cli.dispatch(&args(&["run", "-x", "true"])), 0);

        let seen = log.lock().unwrap();
        // "pos" survived as the positional while -x defaulted to true.
        assert_eq!(seen[0].flag, Some(true));
        assert_eq!(seen[0].first.as_deref(), Some("pos"));
        assert_eq!(seen[1].flag, Some(false));
        assert_eq!(seen[1].first.as_deref(), Some("pos"));
        assert_eq!(seen[2].flag, Some(true));
        assert_eq!(seen[2].first, None);
    }

    #[test]
    fn test_raw_tail_lands_verbatim() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", false, &log);
        let status = cli.dispatch(&args(&["run", "---", "--var", "-x", "push"]));
        assert_eq!(status, 0);
        assert_eq!(log.lock().unwrap()[0].rest, ["--var", "-x", "push"]);
    }

    #[test]
    fn test_binding_failure_skips_execute() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", false, &log);
        assert_eq!(cli.dispatch(&args(&["run", "-a", "banana"])), -1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_help_flag_skips_binding_and_execute() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", false, &log);
        // "banana" would fail binding, but help wins first.
        assert_eq!(cli.dispatch(&args(&["run", "-a", "banana", "--help"])), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unresolved_help_flag_shows_listing() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", false, &log);
        assert_eq!(cli.dispatch(&args(&["--help"])), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_execute_status_passthrough_and_failure() {
        #[derive(Default)]
        struct Exit {
            code: Option<i32>,
        }
        let cli = Cli::new(
            CommandRegistry::builder()
                .command(
                    CommandModel::<Exit>::new("exit", "status passthrough")
                        .positional("code", "status to return", |c| &mut c.code)
                        .run(|c| c.code.unwrap_or(0)),
                )
                .command(
                    CommandModel::<Exit>::new("boom", "always fails")
                        .run(|_| -> Result<(), anyhow::Error> { Err(anyhow::anyhow!("kaput")) }),
                )
                .build()
                .unwrap(),
        );
        assert_eq!(cli.dispatch(&args(&["exit", "42"])), 42);
        assert_eq!(cli.dispatch(&args(&["boom"])), -1);
    }

    #[test]
    fn test_suggestion_for_close_misspelling() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let cli = recording_cli("run", false, &log);
        assert_eq!(cli.suggest_similar("rnu").as_deref(), Some("run"));
        assert_eq!(cli.suggest_similar("zzzzzz"), None);
        assert_eq!(cli.suggest_similar(""), None);
    }

    #[test]
    fn test_cli_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Cli>();
    }

    #[test]
    fn test_attempted_prefix_stops_at_flags() {
        assert_eq!(attempted_prefix(&args(&["a", "b", "-x", "c"])), "a b");
        assert_eq!(attempted_prefix(&args(&["--var", "2"])), "");
        assert_eq!(attempted_prefix(&[]), "");
    }
}
