use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use linework_app::{LineworkArgs, Session, load_or_default};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting Linework {} (engine {})",
        linework_app::VERSION,
        linework_core::VERSION
    );

    let args = LineworkArgs::parse();
    let mut config = load_or_default(args.config_path());
    if args.no_animation {
        log::info!("Animations disabled by --no-animation");
        config.animation.enabled = false;
    }

    let nodes = usize::try_from(args.nodes).unwrap_or(usize::MAX);
    let mut session = match Session::demo(&config, nodes, Duration::from_millis(args.frame_ms)) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to build the demo graph: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = session.run(args.max_frames);
    log::info!(
        "Session {} after {} frames ({} animated): {} steps, {} failed, {} settled",
        if report.completed { "finished" } else { "stopped" },
        report.frames,
        report.animation_frames,
        report.steps_run,
        report.failed_steps,
        report.settled
    );
    log::info!(
        "Final model: {} elements, {} undoable, {} redoable",
        report.elements,
        report.undo_count,
        report.redo_count
    );

    if report.failed_steps > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
