//! # Linework Core
//!
//! Action/command execution pipeline for interactive diagram editing.
//!
//! Intents arrive as [`Action`](action::Action)s at the
//! [`ActionDispatcher`](dispatcher::ActionDispatcher). Each is turned into a
//! reversible [`Command`](command::Command) that mutates the
//! [`ModelRoot`](model::ModelRoot), either at once or through an
//! [`Animation`](animation::Animation) the host advances frame by frame.
//! The [`CommandStack`](command::CommandStack) keeps the undo/redo history
//! and tells the [`ModelViewer`](viewer::ModelViewer) when a change settles.

pub mod action;
pub mod animation;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod features;
pub mod math;
pub mod model;
pub mod viewer;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
