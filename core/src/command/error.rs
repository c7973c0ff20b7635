//! Errors surfaced by the command pipeline.

use crate::model::ModelError;

/// Error type for command construction and execution.
///
/// Only [`UnregisteredActionKind`](Self::UnregisteredActionKind) and
/// [`ActionMismatch`](Self::ActionMismatch) ever reach a dispatch caller.
/// Errors returned from inside a command are logged by the
/// [`CommandStack`](super::CommandStack) and the call settles with the
/// unchanged model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// No command factory is registered for this action kind.
    #[error("no command registered for action kind `{0}`")]
    UnregisteredActionKind(String),
    /// The factory registered for this kind expects another action type.
    #[error("action of kind `{kind}` does not match the type its command expects")]
    ActionMismatch { kind: String },
    /// The operation is not supported by this command.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// A structural tree mutation failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for command operations.
pub type CommandResult<T = super::CommandOutcome> = Result<T, CommandError>;
