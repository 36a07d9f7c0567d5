//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lectern - scheduled lessons delivered by email, Discord and Telegram
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(about = "Scheduled lesson generation with email, Discord and Telegram delivery", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Working directory holding lessons, logs and backups
    #[arg(long, global = true, env = "LECTERN_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Settings file (defaults to `<workdir>/.env`)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,
}

impl Cli {
    /// The working directory, falling back to the current directory.
    pub fn workdir(&self) -> PathBuf {
        self.workdir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// The settings file path.
    pub fn env_file(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| self.workdir().join(".env"))
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler in the foreground until SIGINT or SIGTERM
    Start,

    /// Stop a running scheduler
    Stop,

    /// Show whether the scheduler is running and its recent log
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate and deliver one lesson now
    Generate {
        /// Lesson kind (series, pro-tip, knowledge, ai-implementation, expert,
        /// monthly-assessment) or weekly-summary
        kind: String,

        /// Override the lesson title
        #[arg(long)]
        title: Option<String>,
    },

    /// Write a progress report into today's folder
    Report,

    /// Move old day folders into archive/
    Archive {
        /// Age in days beyond which folders are archived
        #[arg(long, default_value = "30")]
        days: i64,
    },

    /// Interactive first-time setup
    Setup,

    /// Check API and email configuration
    Check,

    /// Replace the API key in the settings file
    SetApiKey {
        /// OpenRouter key, starting with sk-or-v1-
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_title() {
        let cli = Cli::try_parse_from([
            "lectern",
            "generate",
            "pro-tip",
            "--title",
            "Test Title",
            "--workdir",
            "/tmp/lectern",
        ])
        .unwrap();
        assert_eq!(cli.workdir(), PathBuf::from("/tmp/lectern"));
        assert_eq!(cli.env_file(), PathBuf::from("/tmp/lectern/.env"));
        match cli.command {
            Commands::Generate { kind, title } => {
                assert_eq!(kind, "pro-tip");
                assert_eq!(title.as_deref(), Some("Test Title"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn archive_defaults_to_thirty_days() {
        let cli = Cli::try_parse_from(["lectern", "archive"]).unwrap();
        assert!(matches!(cli.command, Commands::Archive { days: 30 }));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["lectern", "status", "--json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Status { json: true }));
    }
}
