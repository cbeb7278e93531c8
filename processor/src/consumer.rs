//! The consume loop shared by every processor.
//!
//! ```text
//!          receive              decision done            ack sent
//!   Idle ----------> Processing --------------> Acknowledging ----> Idle
//!     \                  \ (settle pause)
//!      \__ shutdown ______\______________________> Shutdown (terminal)
//! ```
//!
//! A record is acknowledged only after its decision completed, whether or not a
//! notification fired. Shutdown can interrupt the wait for a delivery and the
//! settle pause before the ack; either way the in-flight record stays
//! unacknowledged and the broker redelivers it. A record that fails to decode
//! or evaluate ends the run with an error, also unacknowledged. There is no
//! dead-letter queue, so a record that can never be decoded keeps coming back.

use crate::metrics::{ACKED_TOTAL, MESSAGES_TOTAL, NOTIFICATIONS_TOTAL, REDELIVERED_TOTAL, REJECTED_TOTAL};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use wearable_core::broker::{Delivery, MessageSource};
use wearable_core::pacing::Pacer;
use wearable_core::{codec, Queue, Reading, Result};

/// Pause between the decision and the acknowledgement.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Notified,
    Quiet,
}

/// Per-topic decision logic. Handlers keep no state between records.
pub trait Handler {
    fn handle(&mut self, reading: &Reading) -> Result<Outcome>;
}

#[derive(Debug)]
enum State<H> {
    Idle,
    Processing(Delivery<H>),
    Acknowledging(H),
    Shutdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub received: u64,
    pub notified: u64,
    pub acknowledged: u64,
}

pub struct Consumer<S, H, P> {
    source: S,
    handler: H,
    pacer: P,
    settle: Duration,
}

impl<S, H, P> Consumer<S, H, P>
where
    S: MessageSource,
    H: Handler,
    P: Pacer,
{
    pub fn new(source: S, handler: H, pacer: P) -> Self {
        Self {
            source,
            handler,
            pacer,
            settle: DEFAULT_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Consumes until `shutdown` resolves or an error occurs. The source is
    /// closed on shutdown and after a rejected record, and dropped on a
    /// broker error.
    pub async fn run<F>(mut self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        let queue = self.source.queue();
        let mut summary = RunSummary::default();
        let mut state = State::Idle;
        tokio::pin!(shutdown);

        info!("Consuming from {}", queue);

        loop {
            state = match state {
                State::Idle => {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => State::Shutdown,
                        delivery = self.source.receive() => {
                            let delivery = delivery?;
                            MESSAGES_TOTAL.inc();
                            summary.received += 1;
                            if delivery.redelivered {
                                REDELIVERED_TOTAL.inc();
                                warn!("Redelivered record on {}", queue);
                            }
                            State::Processing(delivery)
                        }
                    }
                }
                State::Processing(delivery) => {
                    let outcome = match self.evaluate(queue, &delivery.payload) {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            // Flushes earlier acks; this record stays unacknowledged.
                            if let Err(close_err) = self.source.close().await {
                                warn!("Failed to close {} after rejected record: {}", queue, close_err);
                            }
                            return Err(e);
                        }
                    };
                    if outcome == Outcome::Notified {
                        NOTIFICATIONS_TOTAL.inc();
                        summary.notified += 1;
                    }

                    tokio::select! {
                        biased;
                        _ = &mut shutdown => State::Shutdown,
                        _ = self.pacer.pause(self.settle) => State::Acknowledging(delivery.handle),
                    }
                }
                State::Acknowledging(handle) => {
                    self.source.acknowledge(handle).await?;
                    ACKED_TOTAL.inc();
                    summary.acknowledged += 1;
                    State::Idle
                }
                State::Shutdown => {
                    info!("Shutting down consumer on {}", queue);
                    self.source.close().await?;
                    return Ok(summary);
                }
            };
        }
    }

    fn evaluate(&mut self, queue: Queue, payload: &[u8]) -> Result<Outcome> {
        let outcome = codec::decode(queue, payload).and_then(|reading| {
            debug!("Evaluating record from device {} at {}", reading.device.id, reading.datetime);
            self.handler.handle(&reading)
        });
        if let Err(e) = &outcome {
            REJECTED_TOTAL.inc();
            error!("Rejected record on {}: {}", queue, e);
        }
        outcome
    }
}
