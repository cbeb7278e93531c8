use clap::Parser;
use processor::config::ProcessorArgs;
use processor::{service, LogMonitor, MovementHandler};
use tracing::{error, info};
use wearable_core::Queue;

#[tokio::main]
async fn main() {
    let args = ProcessorArgs::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting position processor");

    match service::run(args, Queue::Positions, MovementHandler::new(LogMonitor)).await {
        Ok(summary) => info!(
            "Position processor stopped after {} records, {} notifications",
            summary.received, summary.notified
        ),
        Err(e) => {
            error!("Position processor failed: {}", e);
            std::process::exit(1);
        }
    }
}
