//! Reversible commands and the stack that executes them.
//!
//! - [`Command`] - a unit of reversible work over the [`ModelRoot`]
//! - [`CommandKind`] - capability tag deciding how history treats a command
//! - [`CommandOutcome`] - immediate result or an animation to drive
//! - [`CommandRegistry`] - action kind to command factory mapping
//! - [`CommandStack`] - undo/redo history, sequencing and settlement
//! - [`Settlement`] - deferred result of an execute/undo/redo call
//!
//! # Command kinds
//!
//! **Normal** commands are undoable and land on the undo stack, merging
//! with the top entry when both agree to. **System** commands are
//! triggered automatically (bounds measurement, model replacement) and are
//! never recorded; running one clears the redo stack because the entries
//! there assumed a world that no longer exists. **Hidden** commands run
//! against a scratch copy of the model whose result goes to an off-screen
//! viewer; they touch neither stack nor the real model.

mod error;
mod registry;
mod settle;
mod stack;

use std::fmt;

use crate::action::AsAny;
use crate::animation::Animation;
use crate::model::ModelRoot;

pub use error::{CommandError, CommandResult};
pub use registry::CommandRegistry;
pub use settle::Settlement;
pub use stack::{CommandStack, DEFAULT_MAX_UNDO};

pub(crate) use settle::{Settler, pending};

/// How the [`CommandStack`] treats a command's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandKind {
    /// Undoable and redoable; pushed onto the undo stack.
    #[default]
    Normal,
    /// Never recorded; clears the redo stack when executed.
    System,
    /// Runs on a scratch model for off-screen rendering only.
    Hidden,
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The model already holds the final state.
    Done,
    /// The final state is reached by driving this animation to `t = 1`.
    Animate(Animation),
}

/// A reversible unit of work bound to one action (Command pattern).
///
/// Commands capture whatever they need to reverse themselves during
/// [`execute`](Self::execute): previous values, snapshots, resolved
/// element ids. Stale references (ids that no longer resolve) are skipped
/// silently rather than reported, since concurrent structural edits are
/// expected.
///
/// # Merging
///
/// When a Normal command is recorded, the command on top of the undo stack
/// is offered the newcomer through [`merge`](Self::merge). Returning `None`
/// means the top absorbed it and the newcomer is discarded; returning
/// `Some(candidate)` hands it back to be pushed on its own.
pub trait Command: fmt::Debug + AsAny + Send {
    /// Capability tag. Default: [`CommandKind::Normal`].
    fn kind(&self) -> CommandKind {
        CommandKind::Normal
    }

    /// A short, human-readable description for history listings.
    fn description(&self) -> &str;

    /// Applies the command for the first time.
    fn execute(&mut self, root: &mut ModelRoot) -> CommandResult;

    /// Reverses [`execute`](Self::execute) (or a previous [`redo`](Self::redo)).
    fn undo(&mut self, root: &mut ModelRoot) -> CommandResult;

    /// Re-applies the command after an [`undo`](Self::undo).
    fn redo(&mut self, root: &mut ModelRoot) -> CommandResult;

    /// Tries to absorb `candidate`, the command recorded right after this one.
    ///
    /// Returns `Some(candidate)` by default (no merging).
    fn merge(&mut self, candidate: Box<dyn Command>) -> Option<Box<dyn Command>> {
        Some(candidate)
    }
}

impl dyn Command {
    /// Downcasts to the concrete command type.
    pub fn downcast_ref<C: Command>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }
}

/// The error System and Hidden commands return from `undo`/`redo`.
///
/// The stack never calls those on non-Normal commands; reaching this means
/// a caller drove a command by hand.
pub fn not_reversible(command: &dyn Command, operation: &str) -> CommandError {
    let which = match command.kind() {
        CommandKind::Normal => "normal",
        CommandKind::System => "system",
        CommandKind::Hidden => "hidden",
    };
    CommandError::InvalidOperation(format!(
        "cannot {operation} {which} command `{}`",
        command.description()
    ))
}
