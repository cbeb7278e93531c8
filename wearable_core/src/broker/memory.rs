//! In-process broker with durable-queue semantics.
//!
//! Messages wait in per-queue FIFOs. A subscription holds at most one
//! unacknowledged delivery; if the subscription is closed or dropped before
//! acknowledging, the message goes back to the front of its queue marked as
//! redelivered, so the next subscriber (this one or a competing one) gets it.

use super::{Delivery, MessageSink, MessageSource};
use crate::errors::{Error, Result};
use crate::queue::Queue;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::debug;

/// Handle for acknowledging a [`MemorySubscription`] delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryTag(u64);

#[derive(Debug, Clone)]
struct StoredMessage {
    tag: u64,
    payload: Vec<u8>,
    redelivered: bool,
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<StoredMessage>,
    in_flight: usize,
}

#[derive(Debug, Default)]
struct State {
    queues: HashMap<Queue, QueueState>,
    next_tag: u64,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    notify: Notify,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    shared: Arc<Shared>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish_to(&self, queue: Queue, payload: Vec<u8>) {
        {
            let mut state = self.lock();
            state.next_tag += 1;
            let tag = state.next_tag;
            state.queues.entry(queue).or_default().ready.push_back(StoredMessage {
                tag,
                payload,
                redelivered: false,
            });
        }
        self.shared.notify.notify_waiters();
    }

    pub fn subscribe(&self, queue: Queue) -> MemorySubscription {
        MemorySubscription {
            broker: self.clone(),
            queue,
            in_flight: None,
        }
    }

    /// Messages waiting for a consumer.
    pub fn pending(&self, queue: Queue) -> usize {
        self.lock().queues.get(&queue).map_or(0, |q| q.ready.len())
    }

    /// Messages delivered but not yet acknowledged.
    pub fn in_flight(&self, queue: Queue) -> usize {
        self.lock().queues.get(&queue).map_or(0, |q| q.in_flight)
    }

    /// Payloads waiting on `queue`, oldest first.
    pub fn snapshot(&self, queue: Queue) -> Vec<Vec<u8>> {
        self.lock()
            .queues
            .get(&queue)
            .map(|q| q.ready.iter().map(|m| m.payload.clone()).collect())
            .unwrap_or_default()
    }

    /// Stops the broker: receivers waiting on an empty queue get [`Error::Closed`].
    pub fn shutdown(&self) {
        self.lock().closed = true;
        self.shared.notify.notify_waiters();
    }

    /// Resolves once `queue` has nothing waiting and nothing in flight.
    pub async fn drained(&self, queue: Queue) {
        loop {
            let notified = self.shared.notify.notified();
            {
                let state = self.lock();
                let idle = state
                    .queues
                    .get(&queue)
                    .map_or(true, |q| q.ready.is_empty() && q.in_flight == 0);
                if idle {
                    return;
                }
            }
            notified.await;
        }
    }

    fn take(&self, queue: Queue) -> Result<Option<StoredMessage>> {
        let mut state = self.lock();
        let closed = state.closed;
        let q = state.queues.entry(queue).or_default();
        match q.ready.pop_front() {
            Some(message) => {
                q.in_flight += 1;
                Ok(Some(message))
            }
            None if closed => Err(Error::Closed),
            None => Ok(None),
        }
    }

    fn settle(&self, queue: Queue, requeue: Option<StoredMessage>) {
        {
            let mut state = self.lock();
            let q = state.queues.entry(queue).or_default();
            q.in_flight = q.in_flight.saturating_sub(1);
            if let Some(mut message) = requeue {
                debug!("Requeueing unacknowledged message {} on {}", message.tag, queue);
                message.redelivered = true;
                q.ready.push_front(message);
            }
        }
        self.shared.notify.notify_waiters();
    }
}

impl MessageSink for MemoryBroker {
    async fn publish(&mut self, queue: Queue, payload: Vec<u8>) -> Result<()> {
        self.publish_to(queue, payload);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MemorySubscription {
    broker: MemoryBroker,
    queue: Queue,
    in_flight: Option<StoredMessage>,
}

impl MemorySubscription {
    fn release(&mut self) {
        if let Some(message) = self.in_flight.take() {
            self.broker.settle(self.queue, Some(message));
        }
    }
}

impl MessageSource for MemorySubscription {
    type Handle = DeliveryTag;

    fn queue(&self) -> Queue {
        self.queue
    }

    async fn receive(&mut self) -> Result<Delivery<DeliveryTag>> {
        if self.in_flight.is_some() {
            return Err(Error::PrefetchExceeded);
        }

        loop {
            let notified = self.broker.shared.notify.notified();
            if let Some(message) = self.broker.take(self.queue)? {
                let delivery = Delivery {
                    payload: message.payload.clone(),
                    redelivered: message.redelivered,
                    handle: DeliveryTag(message.tag),
                };
                self.in_flight = Some(message);
                return Ok(delivery);
            }
            notified.await;
        }
    }

    async fn acknowledge(&mut self, handle: DeliveryTag) -> Result<()> {
        match &self.in_flight {
            Some(message) if message.tag == handle.0 => {
                self.in_flight = None;
                self.broker.settle(self.queue, None);
                Ok(())
            }
            _ => Err(Error::UnknownDelivery),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.release();
        Ok(())
    }
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_delivery_and_ack() {
        tokio_test::block_on(async {
            let broker = MemoryBroker::new();
            broker.publish_to(Queue::Positions, b"first".to_vec());
            broker.publish_to(Queue::Positions, b"second".to_vec());

            let mut sub = broker.subscribe(Queue::Positions);
            let delivery = sub.receive().await.unwrap();
            assert_eq!(delivery.payload, b"first");
            assert!(!delivery.redelivered);
            assert_eq!(broker.in_flight(Queue::Positions), 1);

            sub.acknowledge(delivery.handle).await.unwrap();
            assert_eq!(broker.in_flight(Queue::Positions), 0);
            assert_eq!(broker.pending(Queue::Positions), 1);
        });
    }

    #[test]
    fn test_prefetch_limit_of_one() {
        tokio_test::block_on(async {
            let broker = MemoryBroker::new();
            broker.publish_to(Queue::Medicine, b"a".to_vec());
            broker.publish_to(Queue::Medicine, b"b".to_vec());

            let mut sub = broker.subscribe(Queue::Medicine);
            let _held = sub.receive().await.unwrap();
            assert!(matches!(sub.receive().await, Err(Error::PrefetchExceeded)));
        });
    }

    #[test]
    fn test_drop_without_ack_requeues_at_front() {
        tokio_test::block_on(async {
            let broker = MemoryBroker::new();
            broker.publish_to(Queue::Positions, b"first".to_vec());
            broker.publish_to(Queue::Positions, b"second".to_vec());

            let mut crashed = broker.subscribe(Queue::Positions);
            let _ = crashed.receive().await.unwrap();
            drop(crashed);

            let mut next = broker.subscribe(Queue::Positions);
            let delivery = next.receive().await.unwrap();
            assert_eq!(delivery.payload, b"first");
            assert!(delivery.redelivered);
        });
    }

    #[test]
    fn test_ack_with_foreign_handle_fails() {
        tokio_test::block_on(async {
            let broker = MemoryBroker::new();
            broker.publish_to(Queue::Positions, b"x".to_vec());
            broker.publish_to(Queue::Positions, b"y".to_vec());

            let mut a = broker.subscribe(Queue::Positions);
            let mut b = broker.subscribe(Queue::Positions);
            let da = a.receive().await.unwrap();
            let db = b.receive().await.unwrap();
            assert!(matches!(
                a.acknowledge(db.handle).await,
                Err(Error::UnknownDelivery)
            ));
            a.acknowledge(da.handle).await.unwrap();
        });
    }

    #[test]
    fn test_closed_broker_stops_receivers() {
        tokio_test::block_on(async {
            let broker = MemoryBroker::new();
            broker.shutdown();
            let mut sub = broker.subscribe(Queue::HeartRate);
            assert!(matches!(sub.receive().await, Err(Error::Closed)));
        });
    }

    #[test]
    fn test_drained_resolves_after_ack() {
        tokio_test::block_on(async {
            let broker = MemoryBroker::new();
            broker.drained(Queue::Medicine).await;

            broker.publish_to(Queue::Medicine, b"dose".to_vec());
            let mut sub = broker.subscribe(Queue::Medicine);
            let delivery = sub.receive().await.unwrap();
            sub.acknowledge(delivery.handle).await.unwrap();
            broker.drained(Queue::Medicine).await;
            assert_eq!(broker.snapshot(Queue::Medicine).len(), 0);
        });
    }
}
