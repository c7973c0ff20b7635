//! Built-in actions and their commands.
//!
//! | kind | command | variant |
//! |---|---|---|
//! | `switchEditMode` | [`SwitchEditModeCommand`] | Normal |
//! | `moveHandle` | [`MoveRoutingHandleCommand`] | Normal |
//! | `move` | [`MoveCommand`] | Normal |
//! | `initializeCanvasBounds` | [`InitializeCanvasBoundsCommand`] | System |
//! | `setBounds` | [`SetBoundsCommand`] | System |
//! | `setModel` | [`SetModelCommand`] | System |
//! | `requestBounds` | [`RequestBoundsCommand`] | Hidden |

mod bounds;
mod moving;
pub mod routing;
mod set_model;

use crate::command::CommandRegistry;

pub use bounds::{
    CanvasBoundsInitializer, ElementAndBounds, InitializeCanvasBoundsAction,
    InitializeCanvasBoundsCommand, RequestBoundsAction, RequestBoundsCommand, SetBoundsAction,
    SetBoundsCommand,
};
pub use moving::{ElementMove, MoveAction, MoveCommand};
pub use routing::{
    HandleMove, MoveRoutingHandleAction, MoveRoutingHandleCommand, SwitchEditModeAction,
    SwitchEditModeCommand,
};
pub use set_model::{SetModelAction, SetModelCommand};

/// Registers every built-in command.
pub fn register_default_commands(registry: &mut CommandRegistry) {
    registry.register(SwitchEditModeAction::KIND, SwitchEditModeCommand::new);
    registry.register(MoveRoutingHandleAction::KIND, MoveRoutingHandleCommand::new);
    registry.register(MoveAction::KIND, MoveCommand::new);
    registry.register(
        InitializeCanvasBoundsAction::KIND,
        InitializeCanvasBoundsCommand::new,
    );
    registry.register(SetBoundsAction::KIND, SetBoundsCommand::new);
    registry.register(SetModelAction::KIND, SetModelCommand::new);
    registry.register(RequestBoundsAction::KIND, RequestBoundsCommand::new);
}
