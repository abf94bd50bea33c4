//! Speed Tune CLI - Command-line interface
//!
//! Provides command-line access to the turn-order simulator and the
//! speed-tune search. Logs go to stderr so `--json` output stays clean.

mod commands;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "speedtune")]
#[command(about = "Turn-meter simulator and speed-tune search")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "speed_tune_core_rs=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: commands::Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    commands::handle_command(cli.command)
}
