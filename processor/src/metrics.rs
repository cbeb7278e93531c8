use axum::{routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Opts, Registry, TextEncoder};
use tracing::{error, info};
use wearable_core::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref MESSAGES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "processor_messages_total",
        "Total records delivered by the broker"
    ))
    .unwrap();
    pub static ref REDELIVERED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "processor_redelivered_total",
        "Deliveries the broker flagged as redelivered"
    ))
    .unwrap();
    pub static ref REJECTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "processor_rejected_total",
        "Records that could not be decoded or evaluated"
    ))
    .unwrap();
    pub static ref NOTIFICATIONS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "processor_notifications_total",
        "Notifications raised to the monitor"
    ))
    .unwrap();
    pub static ref ACKED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "processor_acked_total",
        "Records acknowledged to the broker"
    ))
    .unwrap();
}

pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(MESSAGES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REDELIVERED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REJECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NOTIFICATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ACKED_TOTAL.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

async fn metrics_handler() -> String {
    gather_metrics()
}

/// Binds `addr` and serves `/metrics` in the background.
pub async fn serve(addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = Router::new().route("/metrics", get(metrics_handler));
    info!("Metrics listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_exposes_registered_counters() {
        // Registration is process-wide; another test may have done it already.
        let _ = init_metrics();
        ACKED_TOTAL.inc();
        let text = gather_metrics();
        assert!(text.contains("processor_acked_total"));
        assert!(text.contains("processor_messages_total"));
    }
}
