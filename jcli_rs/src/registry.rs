//! Registry construction: the startup half of the pipeline.
//!
//! Built once from [`CommandModel`] declarations, immutable afterwards.
//! Registration problems (duplicate default, duplicate raw sink, missing
//! execute closure, malformed alias, reserved pattern) are fatal startup
//! errors, a different tier from per-call invocation failures.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::command::{CommandDescriptor, CommandModel};
use crate::dispatch::{COMPLETE_SENTINEL, SCRIPT_SENTINEL};
use crate::resolver::TrieNode;

/// Fatal startup-time registration error.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a default command is already registered")]
    DuplicateDefaultCommand,
    #[error("command '{pattern}' declares more than one raw-argument sink")]
    DuplicateRawSink { pattern: String },
    #[error("command '{pattern}' declares no execute body")]
    MissingExecute { pattern: String },
    #[error("command '{pattern}' declares invalid alias '{alias}'")]
    InvalidAlias { pattern: String, alias: String },
    #[error("command pattern '{pattern}' collides with a reserved token")]
    ReservedPattern { pattern: String },
}

/// All declared commands: the pattern trie plus at most one default command.
pub struct CommandRegistry {
    pub(crate) root: TrieNode,
    pub(crate) commands: Vec<Arc<CommandDescriptor>>,
    pub(crate) default: Option<Arc<CommandDescriptor>>,
}

impl CommandRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            descriptors: Vec::new(),
        }
    }

    /// Every registered descriptor (default command included), in
    /// registration order.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.commands.iter()
    }

    /// The command invoked when nothing matches and no help was requested.
    pub fn default_command(&self) -> Option<&Arc<CommandDescriptor>> {
        self.default.as_ref()
    }

    /// Root of the pattern trie.
    pub fn root(&self) -> &TrieNode {
        &self.root
    }
}

/// Collects command models; `build()` materializes and validates them.
pub struct RegistryBuilder {
    descriptors: Vec<Result<CommandDescriptor, RegistryError>>,
}

impl RegistryBuilder {
    /// Add one command declaration. Errors surface from `build()`.
    pub fn command<C: 'static>(mut self, model: CommandModel<C>) -> Self {
        self.descriptors.push(model.into_descriptor());
        self
    }

    pub fn build(self) -> Result<CommandRegistry, RegistryError> {
        let mut root = TrieNode::root();
        let mut commands = Vec::new();
        let mut default: Option<Arc<CommandDescriptor>> = None;

        for descriptor in self.descriptors {
            let descriptor = Arc::new(descriptor?);
            if descriptor.is_default() {
                if default.is_some() {
                    return Err(RegistryError::DuplicateDefaultCommand);
                }
                default = Some(descriptor.clone());
            } else {
                for alternative in descriptor.alternatives() {
                    let first = alternative.split_whitespace().next().unwrap_or("");
                    if first == COMPLETE_SENTINEL || first == SCRIPT_SENTINEL {
                        return Err(RegistryError::ReservedPattern {
                            pattern: alternative.to_string(),
                        });
                    }
                    root.define(alternative, descriptor.clone());
                }
            }
            commands.push(descriptor);
        }

        debug!(
            commands = commands.len(),
            has_default = default.is_some(),
            "command registry built"
        );
        Ok(CommandRegistry {
            root,
            commands,
            default,
        })
    }
}
