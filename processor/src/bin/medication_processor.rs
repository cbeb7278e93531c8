use clap::Parser;
use processor::config::ProcessorArgs;
use processor::{service, LogMonitor, MedicationHandler};
use tracing::{error, info};
use wearable_core::Queue;

#[tokio::main]
async fn main() {
    let args = ProcessorArgs::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting medication processor");

    match service::run(args, Queue::Medicine, MedicationHandler::new(LogMonitor)).await {
        Ok(summary) => info!(
            "Medication processor stopped after {} records, {} notifications",
            summary.received, summary.notified
        ),
        Err(e) => {
            error!("Medication processor failed: {}", e);
            std::process::exit(1);
        }
    }
}
