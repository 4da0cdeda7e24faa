//! Marketplace simulation entry point.
//!
//! ```text
//! RUST_LOG=info cargo run -p taskhub-demo
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;

const ROUNDS: usize = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let seed = rand::random::<u64>();
    info!(seed, rounds = ROUNDS, "starting marketplace simulation");

    // The core is synchronous; keep it off the async worker threads.
    let report = tokio::task::spawn_blocking(move || taskhub_demo::run_demo(seed, ROUNDS)).await??;

    info!(
        posted = report.tasks_posted,
        assigned = report.tasks_assigned,
        completed = report.tasks_completed,
        failed = report.tasks_failed,
        avg_winning_bid = %report.avg_winning_bid,
        trusted = report.trusted_agents.len(),
        "simulation report"
    );

    Ok(())
}
