//! Toggling routing edit mode on edges.

use crate::action::Action;
use crate::command::{Command, CommandOutcome, CommandResult};
use crate::model::{Element, ElementId, ModelRoot};

use super::handles::{create_routing_handles, has_routing_handles, remove_routing_handles};

/// Puts edges into or out of routing edit mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwitchEditModeAction {
    pub elements_to_activate: Vec<ElementId>,
    pub elements_to_deactivate: Vec<ElementId>,
}

impl SwitchEditModeAction {
    pub const KIND: &'static str = "switchEditMode";

    pub fn new(
        elements_to_activate: impl IntoIterator<Item = impl Into<ElementId>>,
        elements_to_deactivate: impl IntoIterator<Item = impl Into<ElementId>>,
    ) -> Self {
        Self {
            elements_to_activate: elements_to_activate.into_iter().map(Into::into).collect(),
            elements_to_deactivate: elements_to_deactivate.into_iter().map(Into::into).collect(),
        }
    }

    pub fn activate(ids: impl IntoIterator<Item = impl Into<ElementId>>) -> Self {
        Self {
            elements_to_activate: ids.into_iter().map(Into::into).collect(),
            elements_to_deactivate: Vec::new(),
        }
    }

    pub fn deactivate(ids: impl IntoIterator<Item = impl Into<ElementId>>) -> Self {
        Self {
            elements_to_activate: Vec::new(),
            elements_to_deactivate: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl Action for SwitchEditModeAction {
    fn kind(&self) -> &str {
        Self::KIND
    }
}

/// Materializes or removes routing handles.
///
/// Activation only touches edges that allow routing edits and carry no
/// handles yet. Deactivation strips handles from any routable element.
/// Undo remembers which elements actually changed and reverses exactly
/// those: deactivated edges get back the very handles they lost, ids and
/// kinds included, activated ones lose theirs.
#[derive(Debug)]
pub struct SwitchEditModeCommand {
    action: SwitchEditModeAction,
    activated: Vec<ElementId>,
    deactivated: Vec<(ElementId, Vec<Element>)>,
}

impl SwitchEditModeCommand {
    pub fn new(action: &SwitchEditModeAction) -> Self {
        Self {
            action: action.clone(),
            activated: Vec::new(),
            deactivated: Vec::new(),
        }
    }
}

impl Command for SwitchEditModeCommand {
    fn description(&self) -> &str {
        "Switch edit mode"
    }

    fn execute(&mut self, root: &mut ModelRoot) -> CommandResult {
        self.activated.clear();
        self.deactivated.clear();
        for id in &self.action.elements_to_activate {
            let Some(element) = root.get(id.as_str()) else {
                log::debug!("Edit mode: skipping missing element {id}");
                continue;
            };
            if !element.can_edit_routing() || has_routing_handles(root, id.as_str()) {
                continue;
            }
            create_routing_handles(root, id.as_str())?;
            self.activated.push(id.clone());
        }
        for id in &self.action.elements_to_deactivate {
            let Some(element) = root.get(id.as_str()) else {
                log::debug!("Edit mode: skipping missing element {id}");
                continue;
            };
            if !element.is_routable() {
                continue;
            }
            let removed = remove_routing_handles(root, id.as_str());
            if !removed.is_empty() {
                self.deactivated.push((id.clone(), removed));
            }
        }
        Ok(CommandOutcome::Done)
    }

    fn undo(&mut self, root: &mut ModelRoot) -> CommandResult {
        for (id, handles) in self.deactivated.iter().rev() {
            if root.contains(id.as_str()) && !has_routing_handles(root, id.as_str()) {
                root.restore(handles.iter().cloned())?;
            }
        }
        for id in self.activated.iter().rev() {
            if root.contains(id.as_str()) {
                remove_routing_handles(root, id.as_str());
            }
        }
        Ok(CommandOutcome::Done)
    }

    fn redo(&mut self, root: &mut ModelRoot) -> CommandResult {
        self.execute(root)
    }
}
