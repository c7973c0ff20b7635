//! Wholesale model replacement.

use crate::action::Action;
use crate::command::{Command, CommandKind, CommandOutcome, CommandResult};
use crate::model::ModelRoot;

/// Replaces the whole model, typically with an authoritative copy from a
/// remote source.
#[derive(Debug, Clone, PartialEq)]
pub struct SetModelAction {
    pub new_root: ModelRoot,
}

impl SetModelAction {
    pub const KIND: &'static str = "setModel";

    pub fn new(new_root: ModelRoot) -> Self {
        Self { new_root }
    }
}

impl Action for SetModelAction {
    fn kind(&self) -> &str {
        Self::KIND
    }
}

/// The replacement keeps the current canvas bounds when the incoming
/// model has not been measured, since the canvas itself did not change.
#[derive(Debug)]
pub struct SetModelCommand {
    new_root: ModelRoot,
    old_root: Option<ModelRoot>,
}

impl SetModelCommand {
    pub fn new(action: &SetModelAction) -> Self {
        Self {
            new_root: action.new_root.clone(),
            old_root: None,
        }
    }
}

impl Command for SetModelCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::System
    }

    fn description(&self) -> &str {
        "Set model"
    }

    fn execute(&mut self, root: &mut ModelRoot) -> CommandResult {
        if !self.new_root.canvas_bounds.is_valid_dimension() {
            self.new_root.canvas_bounds = root.canvas_bounds;
        }
        self.old_root = Some(std::mem::replace(root, self.new_root.clone()));
        Ok(CommandOutcome::Done)
    }

    fn undo(&mut self, root: &mut ModelRoot) -> CommandResult {
        if let Some(old_root) = &self.old_root {
            *root = old_root.clone();
        }
        Ok(CommandOutcome::Done)
    }

    fn redo(&mut self, root: &mut ModelRoot) -> CommandResult {
        *root = self.new_root.clone();
        Ok(CommandOutcome::Done)
    }
}
