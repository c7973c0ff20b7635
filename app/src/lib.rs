//! # Linework App
//!
//! Headless host for the Linework diagram engine.
//!
//! This crate wires the engine to a simulated frame clock. It loads the
//! engine configuration, builds a demo graph and plays a scripted editing
//! session against it while a logging viewer answers the engine's
//! measuring requests.
//!
//! ## Overview
//!
//! - [`LineworkArgs`] - Command line arguments
//! - [`load_or_default`] - Engine configuration from a TOML file
//! - [`LoggingViewer`] - Viewer that logs updates and reports measurements
//! - [`Session`] - Scripted frame loop around the action dispatcher
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use linework_app::{Session, load_or_default};
//!
//! let config = load_or_default("linework.toml".as_ref());
//! let mut session = Session::demo(&config, 8, Duration::from_millis(16)).unwrap();
//! let report = session.run(Some(600));
//! println!("{report:?}");
//! ```

pub mod args;
pub mod config;
pub mod session;
pub mod viewer;

pub use args::LineworkArgs;
pub use config::{ConfigError, load_config, load_or_default};
pub use session::{Session, SessionReport, Step};
pub use viewer::LoggingViewer;

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
