use crate::config::ProcessorArgs;
use crate::consumer::{Consumer, Handler, RunSummary};
use crate::metrics;
use crate::mqtt::MqttSource;
use std::time::Duration;
use tracing::{error, info, warn};
use wearable_core::pacing::TokioPacer;
use wearable_core::{Queue, Result};

/// Runs one processor process: metrics, broker subscription and the consume
/// loop, until Ctrl-C or the first error.
pub async fn run<H: Handler>(args: ProcessorArgs, queue: Queue, handler: H) -> Result<RunSummary> {
    if let Err(e) = metrics::init_metrics() {
        warn!("Failed to register metrics: {}", e);
    }
    if let Some(addr) = &args.metrics_addr {
        metrics::serve(addr).await?;
    }

    let params = args.mqtt_params(queue);
    info!(
        "MQTT broker: {}:{}, client id: {}",
        params.host, params.port, params.client_id
    );
    let source = MqttSource::connect(&params, queue).await?;

    Consumer::new(source, handler, TokioPacer)
        .with_settle(Duration::from_millis(args.settle_ms))
        .run(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            error!("Cannot listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
