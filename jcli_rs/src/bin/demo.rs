//! Demo host binary: registers a representative command set and hands the
//! process arguments to the dispatch pipeline.
//!
//! Doubles as the end-to-end test target (`tests/e2e_cli.rs`): multi-word
//! patterns, a default command, boolean and validated arguments, a raw sink,
//! and a scope-injected service are all reachable from here.

use anyhow::Result;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use jcli::{Cli, CommandModel, CommandRegistry, RegistryError, Services};

/// Scope-provided collaborator: greeting prefix shared by `greet`.
struct Greeting {
    prefix: String,
}

#[derive(Default)]
struct Greet {
    prefix: String,
    name: String,
    loud: Option<bool>,
    times: Option<u32>,
}

#[derive(Default, Serialize)]
struct Note {
    text: String,
    tag: Option<String>,
    priority: Option<u32>,
}

#[derive(Default)]
struct NoteList {
    limit: Option<usize>,
}

#[derive(Default)]
struct Echo {
    upper: Option<bool>,
    rest: Vec<String>,
}

#[derive(Default)]
struct ExitWith {
    code: Option<i32>,
}

#[derive(Default, Serialize)]
struct Fallback {
    var: Option<String>,
}

fn build_registry() -> Result<CommandRegistry, RegistryError> {
    CommandRegistry::builder()
        .command(
            CommandModel::<Greet>::with_factory("greet|hello", "Print a greeting", |scope| {
                Greet {
                    prefix: scope
                        .resolve::<Greeting>()
                        .map(|g| g.prefix.clone())
                        .unwrap_or_else(|| "Hello".to_string()),
                    ..Default::default()
                }
            })
            .positional("name", "Who to greet", |c| &mut c.name)
            .named(&["l", "loud"], "Shout the greeting", |c| &mut c.loud)
            .named_checked(
                &["times"],
                "Repeat the greeting (1-10)",
                |c| &mut c.times,
                |v| match v {
                    Some(n) if !(1..=10).contains(n) => Err("must be between 1 and 10".into()),
                    _ => Ok(()),
                },
            )
            .run(|c| {
                let line = format!("{}, {}", c.prefix, c.name);
                let line = if c.loud.unwrap_or(false) {
                    format!("{}!!!", line.to_uppercase())
                } else {
                    line
                };
                for _ in 0..c.times.unwrap_or(1) {
                    println!("{line}");
                }
            }),
        )
        .command(
            CommandModel::<Note>::new("note add|note new", "Store a note")
                .positional("text", "Note body", |c| &mut c.text)
                .named(&["t", "tag"], "Label the note", |c| &mut c.tag)
                .named_checked(
                    &["p", "priority"],
                    "Priority (1-5)",
                    |c| &mut c.priority,
                    |v| match v {
                        Some(n) if !(1..=5).contains(n) => Err("must be between 1 and 5".into()),
                        _ => Ok(()),
                    },
                )
                .run(|c| -> Result<()> {
                    println!("{}", serde_json::to_string_pretty(c)?);
                    Ok(())
                }),
        )
        .command(
            CommandModel::<NoteList>::new("note list", "List stored notes")
                .named(&["n", "limit"], "Show at most this many", |c| &mut c.limit)
                .run(|c| {
                    let shown = c.limit.unwrap_or(0);
                    println!("{}", serde_json::json!({ "notes": [], "limit": shown }));
                }),
        )
        .command(
            CommandModel::<Echo>::new("echo", "Print the raw tail verbatim")
                .named(&["u", "upper"], "Uppercase the output", |c| &mut c.upper)
                .raw_args(|c| &mut c.rest)
                .run(|c| {
                    let joined = c.rest.join(" ");
                    if c.upper.unwrap_or(false) {
                        println!("{}", joined.to_uppercase());
                    } else {
                        println!("{joined}");
                    }
                }),
        )
        .command(
            CommandModel::<ExitWith>::new("exit", "Return a status code verbatim")
                .positional("code", "Status code to return", |c| &mut c.code)
                .run(|c| c.code.unwrap_or(0)),
        )
        .command(
            CommandModel::<Fallback>::new("", "Fallback when nothing matches")
                .named(&["var"], "A variable to echo back", |c| &mut c.var)
                .run(|c| {
                    println!("{}", serde_json::json!({ "var": c.var.clone() }));
                }),
        )
        .build()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(error) => {
            eprintln!("ERROR: {error}");
            std::process::exit(1);
        }
    };

    let mut services = Services::new();
    services.provide(|_| Greeting {
        prefix: "Hello".to_string(),
    });

    let cli = Cli::with_services(registry, services);
    std::process::exit(cli.run());
}
