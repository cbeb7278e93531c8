use std::future::Future;
use std::time::Duration;

/// Source of the deliberate pauses in the pipeline: between the sends of a
/// publish cycle and before a consumer acknowledges a record.
pub trait Pacer {
    fn pause(&mut self, period: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    async fn pause(&mut self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}

/// Returns immediately and remembers every requested pause.
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    pub pauses: Vec<Duration>,
}

impl Pacer for RecordingPacer {
    async fn pause(&mut self, period: Duration) {
        self.pauses.push(period);
    }
}
