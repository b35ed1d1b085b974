//! Sweetspot CLI: head-tracked stereo balance from a webcam.
//!
//! Usage:
//!   sweetspot run [OPTIONS]    Start tracking and steering the balance
//!   sweetspot check            Check system capabilities

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "sweetspot",
    about = "Steers the stereo sweet spot toward your head using the webcam",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the head-tracking balance loop
    Run {
        /// Zero-based camera device index
        #[arg(long)]
        camera: Option<u32>,

        /// Sensitivity divisor for the offset-to-balance mapping (> 0)
        #[arg(long)]
        sensitivity: Option<f64>,

        /// Minimum milliseconds between audio backend updates
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Start in eqMac mode instead of system audio
        #[arg(long)]
        eqmac: bool,

        /// Start with the cosmetic cartoon filter enabled
        #[arg(long)]
        cartoon_filter: bool,

        /// Never open a preview window
        #[arg(long)]
        no_preview: bool,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    sweetspot_common::logging::init_logging(&sweetspot_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Run {
            camera,
            sensitivity,
            interval_ms,
            eqmac,
            cartoon_filter,
            no_preview,
        } => {
            commands::run::run(
                camera,
                sensitivity,
                interval_ms,
                eqmac,
                cartoon_filter,
                no_preview,
            )
            .await
        }
        Commands::Check => commands::check::run(),
    }
}
