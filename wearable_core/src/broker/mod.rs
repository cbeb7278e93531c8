//! Capabilities the pipeline needs from a message broker.
//!
//! Producers only publish; consumers receive one delivery at a time and
//! acknowledge it explicitly once the record has been evaluated. Anything not
//! acknowledged before the subscription goes away is the broker's to redeliver.

pub mod memory;

use crate::errors::Result;
use crate::queue::Queue;
use std::future::Future;

pub use memory::{DeliveryTag, MemoryBroker, MemorySubscription};

/// A message handed to a consumer, with the handle needed to acknowledge it.
#[derive(Debug, Clone)]
pub struct Delivery<H> {
    pub payload: Vec<u8>,
    /// Set when the broker has delivered this message before.
    pub redelivered: bool,
    pub handle: H,
}

pub trait MessageSink {
    /// Publishes `payload` to `queue` with persistent, at-least-once delivery.
    fn publish(&mut self, queue: Queue, payload: Vec<u8>) -> impl Future<Output = Result<()>> + Send;
}

/// A subscription to one queue with a prefetch limit of one.
pub trait MessageSource {
    type Handle: Send;

    fn queue(&self) -> Queue;

    /// Waits for the next delivery. Must not be called while a previous
    /// delivery is still unacknowledged.
    fn receive(&mut self) -> impl Future<Output = Result<Delivery<Self::Handle>>> + Send;

    fn acknowledge(&mut self, handle: Self::Handle) -> impl Future<Output = Result<()>> + Send;

    /// Closes the subscription. Unacknowledged deliveries go back to the broker.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}
