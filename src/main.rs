use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use scout::api::{AppState, create_router};
use scout::board::MessageBoard;
use scout::config::CONFIG;
use scout::dispatcher::Dispatcher;
use scout::extractor::Extractor;
use scout::fetcher::HttpFetcher;
use scout::schedule::{JsonFileStore, Schedule};

#[derive(Parser, Debug)]
#[command(name = "scout", about = "Classifieds search bot with a shared schedule")]
struct Cli {
    /// Address to listen on (overrides SCOUT_LISTEN_ADDR)
    #[arg(long)]
    listen: Option<String>,

    /// Schedule store file (overrides SCOUT_SCHEDULE_PATH)
    #[arg(long)]
    schedule: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let fetcher = HttpFetcher::from_config(&CONFIG).context("invalid search endpoint")?;
    let extractor = Extractor::from_config(&CONFIG).context("invalid extractor setup")?;
    let board = Arc::new(MessageBoard::new());
    let dispatcher = Dispatcher::new(
        Arc::new(fetcher),
        extractor,
        board.clone(),
        CONFIG.session_timeout,
    );

    let schedule_path = cli.schedule.unwrap_or_else(|| CONFIG.schedule_path.clone());
    let schedule = Schedule::new(JsonFileStore::new(&schedule_path));

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        board,
        schedule: Arc::new(schedule),
    };

    let addr = cli.listen.unwrap_or_else(|| CONFIG.listen_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!(
        "listening on {addr}, sessions expire after {}s idle, schedule at {schedule_path}",
        CONFIG.session_timeout.as_secs()
    );

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
