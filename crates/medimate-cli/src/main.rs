mod cli;
mod commands;
mod completions;
mod config;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{ChatArgs, Cli, Commands};
use medimate_ai::MediMateClient;
use medimate_core::ConsultationSession;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error::handle_error(err);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Chat(ChatArgs::default()));
    if let Commands::Completions { shell } = command {
        completions::generate_completions(shell);
        return Ok(());
    }

    let _log_guard = init_logging(cli.verbose);
    let config = config::CliConfig::load();

    let base_url = config.base_url(cli.api_url.as_deref());
    let client =
        MediMateClient::new(base_url)?.with_request_timeout(config.server.request_timeout());
    tracing::info!(base_url = %client.base_url(), "MediMate CLI started");

    let session = ConsultationSession::new(client);
    match command {
        Commands::Chat(args) => commands::chat::run(&session, &config, args, cli.format).await,
        Commands::Status => commands::status::run(&session, cli.format).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Log to a daily-rolling file so terminal output stays clean.
fn init_logging(verbose: bool) -> Option<WorkerGuard> {
    let log_dir = config::log_dir()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("medimate")
        .filename_suffix("log")
        .build(log_dir)
        .ok()?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    Some(guard)
}
