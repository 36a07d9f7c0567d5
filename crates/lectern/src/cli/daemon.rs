//! Daemon lifecycle command handlers.

use lectern::{
    Daemon, DaemonContext, DaemonExit, DaemonStatus, LecternResult, Settings, StopOutcome,
    stop_daemon,
};

/// Handle the `start` command
pub async fn handle_start(settings: Settings) -> LecternResult<()> {
    let ctx = DaemonContext::from_settings(settings)?;
    tracing::info!(
        workdir = %ctx.settings().workdir().display(),
        jobs = ctx.schedule().jobs().len(),
        "Starting lesson scheduler. Press Ctrl+C to stop."
    );
    match Daemon::new(ctx).run().await? {
        DaemonExit::Refused(pid) => {
            println!("Daemon already running (PID {}). Use `lectern stop` first.", pid);
        }
        DaemonExit::Stopped => println!("Daemon stopped."),
    }
    Ok(())
}

/// Handle the `stop` command
pub async fn handle_stop(settings: &Settings) -> LecternResult<()> {
    match stop_daemon(&settings.pid_file()).await? {
        StopOutcome::NotRunning => println!("Daemon is not running."),
        StopOutcome::StaleRemoved => println!("Removed stale PID file."),
        StopOutcome::Stopped(pid) => println!("Stopped daemon (PID {}).", pid),
        StopOutcome::Killed(pid) => println!("Daemon (PID {}) did not exit, killed it.", pid),
    }
    Ok(())
}

/// Handle the `status` command
pub fn handle_status(settings: &Settings, json: bool) -> LecternResult<()> {
    let status = DaemonStatus::collect(settings);
    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| lectern::ConfigError::new(format!("Failed to render status: {}", e)))?;
        println!("{}", rendered);
    } else {
        print!("{}", status);
    }
    Ok(())
}
