//! Command line arguments.
//!
//! Uses clap for CLI parsing with help text (`--help`), validation and
//! clear error messages.

use std::path::{Path, PathBuf};

use clap::Parser;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "linework.toml";

/// Linework host arguments.
///
/// # Examples
///
/// ```bash
/// # Show help
/// ./linework --help
///
/// # Run the demo session with a larger graph
/// ./linework --nodes 32
///
/// # Settle every command on the frame it runs
/// ./linework --no-animation
///
/// # Stop after 100 frames (useful for testing)
/// ./linework --max-frames 100
/// ```
#[derive(Parser, Debug, Clone)]
#[command(
    name = "linework",
    about = "Headless Linework diagram engine host",
    long_about = "Runs a scripted editing session against the Linework engine with a \
        simulated frame clock.\n\n\
        The session loads a star-shaped demo graph, measures it, scrambles the \
        nodes, edits an edge route through its routing handles and walks the undo \
        history. Every settled model is reported through the log.\n\n\
        CONFIGURATION:\n\
        Animation timing and history depth are read from a TOML file \
        (default: linework.toml). Missing files fall back to defaults.\n\n\
        EXAMPLES:\n  \
          ./linework --nodes 16\n  \
          RUST_LOG=debug ./linework --config demo.toml --max-frames 200",
    version
)]
pub struct LineworkArgs {
    /// Path to the engine configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Exit after N frames even if the session has not finished.
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Simulated frame interval in milliseconds.
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_ms: u64,

    /// Number of satellite nodes in the demo graph.
    #[arg(long, default_value = "8", value_parser = clap::value_parser!(u64).range(1..=4096))]
    pub nodes: u64,

    /// Disable animations regardless of the config file.
    #[arg(long)]
    pub no_animation: bool,
}

impl LineworkArgs {
    /// The config file to load.
    pub fn config_path(&self) -> &Path {
        self.config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH))
    }
}
