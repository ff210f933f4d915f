//! Per-call invocation failures.
//!
//! Every variant is caught at the pipeline boundary, rendered as
//! `ERROR: <message>` on stderr, and mapped to status -1. None propagate past
//! the top-level entry point.

use thiserror::Error;

fn unknown_command_text(attempted: &str) -> String {
    if attempted.is_empty() {
        "No command provided".to_string()
    } else {
        format!("Unknown command '{attempted}'")
    }
}

/// Recoverable failure of one dispatch call.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Nothing resolved and no default command could take over. An empty
    /// attempted prefix means the input itself was empty.
    #[error("{}", unknown_command_text(.attempted))]
    UnknownCommand { attempted: String },

    /// A text token arrived past the last declared positional slot.
    #[error("Stray positional argument '{token}'")]
    StrayPositionalArgument { token: String },

    /// A flag token matched no declared alias.
    #[error("Unknown named argument '{name}'")]
    UnknownNamedArgument { name: String },

    /// A non-boolean named argument sat at the end of the stream.
    #[error("Missing value for named argument '{name}'")]
    MissingValueForNamedArgument { name: String },

    /// Required arguments never observed during the binding loop. Carries
    /// flag names for named arguments, "[position] name" pairs for
    /// positionals.
    #[error("Missing required arguments: {}", .names.join(", "))]
    MissingRequiredArguments { names: Vec<String> },

    /// A binder or attached validator rejected a value. Always tagged with
    /// the offending argument's display name.
    #[error("Invalid value for {argument}: {message}")]
    BindingValidationFailure { argument: String, message: String },

    /// The command's own execute body returned an error.
    #[error("{message}")]
    UnhandledExecutionFailure { message: String },
}
