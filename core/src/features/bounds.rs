//! Bounds measured by the rendering side.
//!
//! Element and canvas sizes are only known after rendering. The viewer
//! measures them (off-screen for [`RequestBoundsAction`]) and reports back
//! with System actions, which never enter the undo history.

use crate::action::Action;
use crate::command::{Command, CommandKind, CommandOutcome, CommandResult, not_reversible};
use crate::math::Bounds;
use crate::model::{ElementId, ModelRoot};

/// Records the measured canvas bounds on the model root.
#[derive(Debug, Clone, PartialEq)]
pub struct InitializeCanvasBoundsAction {
    pub new_canvas_bounds: Bounds,
}

impl InitializeCanvasBoundsAction {
    pub const KIND: &'static str = "initializeCanvasBounds";

    pub fn new(new_canvas_bounds: Bounds) -> Self {
        Self { new_canvas_bounds }
    }
}

impl Action for InitializeCanvasBoundsAction {
    fn kind(&self) -> &str {
        Self::KIND
    }
}

#[derive(Debug)]
pub struct InitializeCanvasBoundsCommand {
    new_bounds: Bounds,
    old_bounds: Bounds,
}

impl InitializeCanvasBoundsCommand {
    pub fn new(action: &InitializeCanvasBoundsAction) -> Self {
        Self {
            new_bounds: action.new_canvas_bounds,
            old_bounds: Bounds::EMPTY,
        }
    }
}

impl Command for InitializeCanvasBoundsCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::System
    }

    fn description(&self) -> &str {
        "Initialize canvas bounds"
    }

    fn execute(&mut self, root: &mut ModelRoot) -> CommandResult {
        self.old_bounds = root.canvas_bounds;
        self.redo(root)
    }

    fn undo(&mut self, root: &mut ModelRoot) -> CommandResult {
        root.canvas_bounds = self.old_bounds;
        Ok(CommandOutcome::Done)
    }

    fn redo(&mut self, root: &mut ModelRoot) -> CommandResult {
        root.canvas_bounds = self.new_bounds;
        Ok(CommandOutcome::Done)
    }
}

/// Decides when the measured canvas size must be reported.
///
/// Only a root whose canvas bounds are still unmeasured is a candidate, and
/// only a measurement that actually differs produces an action.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasBoundsInitializer;

impl CanvasBoundsInitializer {
    pub fn check(&self, root: &ModelRoot, measured: Bounds) -> Option<InitializeCanvasBoundsAction> {
        if root.canvas_bounds.is_valid_dimension() || measured.almost_equals(&root.canvas_bounds) {
            return None;
        }
        Some(InitializeCanvasBoundsAction::new(measured))
    }
}

/// New bounds for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAndBounds {
    pub element_id: ElementId,
    pub new_bounds: Bounds,
}

/// Writes measured bounds into bounds-aware elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetBoundsAction {
    pub bounds: Vec<ElementAndBounds>,
}

impl SetBoundsAction {
    pub const KIND: &'static str = "setBounds";

    pub fn new(bounds: Vec<ElementAndBounds>) -> Self {
        Self { bounds }
    }
}

impl Action for SetBoundsAction {
    fn kind(&self) -> &str {
        Self::KIND
    }
}

#[derive(Debug, Clone)]
struct BoundsChange {
    element: ElementId,
    old_bounds: Option<Bounds>,
    old_revalidate: bool,
    new_bounds: Bounds,
}

#[derive(Debug)]
pub struct SetBoundsCommand {
    action: SetBoundsAction,
    changes: Vec<BoundsChange>,
}

impl SetBoundsCommand {
    pub fn new(action: &SetBoundsAction) -> Self {
        Self {
            action: action.clone(),
            changes: Vec::new(),
        }
    }
}

impl Command for SetBoundsCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::System
    }

    fn description(&self) -> &str {
        "Set bounds"
    }

    fn execute(&mut self, root: &mut ModelRoot) -> CommandResult {
        self.changes = self
            .action
            .bounds
            .iter()
            .filter_map(|entry| {
                let element = root.get(entry.element_id.as_str())?;
                if !element.is_bounds_aware() {
                    return None;
                }
                Some(BoundsChange {
                    element: element.id.clone(),
                    old_bounds: element.bounds,
                    old_revalidate: element.revalidate_bounds,
                    new_bounds: entry.new_bounds,
                })
            })
            .collect();
        self.redo(root)
    }

    fn undo(&mut self, root: &mut ModelRoot) -> CommandResult {
        for change in &self.changes {
            if let Some(element) = root.get_mut(change.element.as_str()) {
                element.bounds = change.old_bounds;
                element.revalidate_bounds = change.old_revalidate;
            }
        }
        Ok(CommandOutcome::Done)
    }

    fn redo(&mut self, root: &mut ModelRoot) -> CommandResult {
        for change in &self.changes {
            if let Some(element) = root.get_mut(change.element.as_str()) {
                element.bounds = Some(change.new_bounds);
                element.revalidate_bounds = false;
            }
        }
        Ok(CommandOutcome::Done)
    }
}

/// Asks the viewer to measure a model off-screen.
///
/// With `new_root` set, that model is measured instead of the current one;
/// this is how a freshly received model gets its sizes before it replaces
/// the visible one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestBoundsAction {
    pub new_root: Option<ModelRoot>,
}

impl RequestBoundsAction {
    pub const KIND: &'static str = "requestBounds";

    pub fn for_model(new_root: ModelRoot) -> Self {
        Self {
            new_root: Some(new_root),
        }
    }
}

impl Action for RequestBoundsAction {
    fn kind(&self) -> &str {
        Self::KIND
    }
}

#[derive(Debug)]
pub struct RequestBoundsCommand {
    new_root: Option<ModelRoot>,
}

impl RequestBoundsCommand {
    pub fn new(action: &RequestBoundsAction) -> Self {
        Self {
            new_root: action.new_root.clone(),
        }
    }
}

impl Command for RequestBoundsCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Hidden
    }

    fn description(&self) -> &str {
        "Request bounds"
    }

    fn execute(&mut self, root: &mut ModelRoot) -> CommandResult {
        if let Some(new_root) = self.new_root.take() {
            let canvas_bounds = root.canvas_bounds;
            *root = new_root;
            root.canvas_bounds = canvas_bounds;
        }
        Ok(CommandOutcome::Done)
    }

    fn undo(&mut self, _root: &mut ModelRoot) -> CommandResult {
        Err(not_reversible(self, "undo"))
    }

    fn redo(&mut self, _root: &mut ModelRoot) -> CommandResult {
        Err(not_reversible(self, "redo"))
    }
}
