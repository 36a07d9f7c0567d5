//! Lectern CLI binary.
//!
//! This binary provides command-line access to Lectern:
//! - Run the lesson scheduler as a foreground daemon
//! - Generate one lesson on demand (the CI entry point)
//! - Configure and check API and email settings

use clap::Parser;
use lectern::observability::{LoggingConfig, init_logging};
use lectern::{LecternResult, Settings};
use std::process::ExitCode;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(cli: Cli) -> LecternResult<ExitCode> {
    let workdir = cli.workdir();
    let env_file = cli.env_file();

    // Setup runs before any settings exist
    if matches!(cli.command, Commands::Setup) {
        let _guard = start_logging(&cli, false, None);
        cli::handle_setup(&workdir, &env_file).await?;
        return Ok(ExitCode::SUCCESS);
    }
    if let Commands::SetApiKey { key } = &cli.command {
        let _guard = start_logging(&cli, false, None);
        cli::handle_set_api_key(&env_file, key)?;
        return Ok(ExitCode::SUCCESS);
    }

    let settings = Settings::load(&workdir, &env_file)?;
    let log_file = matches!(cli.command, Commands::Start).then(|| settings.log_file());
    let _guard = start_logging(&cli, *settings.debug_mode(), log_file);

    let code = match cli.command {
        Commands::Start => {
            cli::handle_start(settings).await?;
            ExitCode::SUCCESS
        }
        Commands::Stop => {
            cli::handle_stop(&settings).await?;
            ExitCode::SUCCESS
        }
        Commands::Status { json } => {
            cli::handle_status(&settings, json)?;
            ExitCode::SUCCESS
        }
        Commands::Generate { kind, title } => {
            exit_code(cli::handle_generate(settings, &kind, title).await?)
        }
        Commands::Report => {
            cli::handle_report(&settings).await?;
            ExitCode::SUCCESS
        }
        Commands::Archive { days } => {
            cli::handle_archive(&settings, days).await?;
            ExitCode::SUCCESS
        }
        Commands::Check => exit_code(cli::handle_check(&settings).await?),
        Commands::Setup | Commands::SetApiKey { .. } => ExitCode::SUCCESS,
    };
    Ok(code)
}

fn start_logging(
    cli: &Cli,
    debug_mode: bool,
    log_file: Option<std::path::PathBuf>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let mut config = LoggingConfig::default()
        .with_verbose(cli.verbose || debug_mode)
        .with_json_logs(cli.json_logs);
    if let Some(path) = log_file {
        config = config.with_log_file(path);
    }
    match init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    }
}
