//! Interactive editing of edge routes.
//!
//! - [`SwitchEditModeAction`] - materializes or removes routing handles
//! - [`MoveRoutingHandleAction`] - drags handles, upgrading line handles
//!   into new routing points
//! - [`handles`] helpers - the canonical handle set shared by both and by
//!   animation restores

pub mod handles;
mod edit_mode;
mod move_handles;

pub use edit_mode::{SwitchEditModeAction, SwitchEditModeCommand};
pub use handles::{
    canonical_handle_id, create_routing_handles, find_handle, has_routing_handles,
    remove_routing_handles, reset_routing_handles,
};
pub use move_handles::{HandleMove, MoveRoutingHandleAction, MoveRoutingHandleCommand};
