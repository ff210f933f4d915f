//! # jcli
//!
//! Pattern-based command dispatch with typed argument binding and shell
//! tab-completion.
//!
//! Declare commands once at startup — a pattern (with `|` alternation and
//! multi-word paths), named and positional arguments bound into typed
//! fields, an optional raw-argument sink — then hand the process argument
//! vector to the pipeline: it resolves the most specific matching command,
//! binds and validates every token, and executes, returning a status code.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      User Input (argv)                     │
//! └────────────────────────────┬───────────────────────────────┘
//!                              ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │  TokenStream   classified tokens, snapshot/rewind          │
//! │  TrieNode      longest-match pattern resolution            │
//! │  bind loop     positional / named / boolean / raw rules    │
//! │  ServiceScope  per-call constructor injection              │
//! └────────────────────────────┬───────────────────────────────┘
//!                              ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │  execute() → status code (0 / verbatim integer / -1)       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use jcli::{Cli, CommandModel, CommandRegistry};
//!
//! #[derive(Default)]
//! struct Greet {
//!     name: String,
//!     loud: Option<bool>,
//! }
//!
//! let registry = CommandRegistry::builder()
//!     .command(
//!         CommandModel::<Greet>::new("greet|hello", "Print a greeting")
//!             .positional("name", "Who to greet", |c| &mut c.name)
//!             .named(&["l", "loud"], "Shout it", |c| &mut c.loud)
//!             .run(|c| {
//!                 if c.loud.unwrap_or(false) {
//!                     println!("{}!!!", c.name.to_uppercase());
//!                 } else {
//!                     println!("Hello, {}", c.name);
//!                 }
//!             }),
//!     )
//!     .build()
//!     .expect("valid command declarations");
//!
//! std::process::exit(Cli::new(registry).run());
//! ```
//!
//! Reserved first tokens: `__jcli:complete` answers a shell completion
//! query, `__jcli:bash_complete_script` prints a bash completion script for
//! the running executable. `-h`/`--help` anywhere in a command's argument
//! stream short-circuits to its help text, and `---` starts the verbatim
//! raw-argument tail.

pub mod binder;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod help;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod token;

pub use binder::{BindError, BindValue};
pub use command::{
    CommandDescriptor, CommandModel, IntoStatus, NamedArgumentSpec, PositionalArgumentSpec,
};
pub use dispatch::{COMPLETE_SENTINEL, Cli, SCRIPT_SENTINEL};
pub use error::InvokeError;
pub use registry::{CommandRegistry, RegistryBuilder, RegistryError};
pub use resolver::{Resolution, TrieNode};
pub use scope::{ServiceScope, Services};
pub use token::{ArgumentToken, TokenStream};
