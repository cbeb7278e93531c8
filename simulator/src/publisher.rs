use crate::device::Device;
use crate::vitals;
use chrono::Local;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info};
use wearable_core::broker::MessageSink;
use wearable_core::pacing::Pacer;
use wearable_core::{codec, Queue, Result, WireFormat};

/// Pause between two consecutive sends of a publish cycle.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Sends one record per queue for a device, in [`Queue::PUBLISH_ORDER`],
/// pausing between sends.
pub struct Publisher<S, P> {
    sink: S,
    pacer: P,
    format: WireFormat,
    pacing: Duration,
}

impl<S: MessageSink, P: Pacer> Publisher<S, P> {
    pub fn new(sink: S, pacer: P, format: WireFormat) -> Self {
        Self {
            sink,
            pacer,
            format,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// One publish cycle. The first failing send aborts the cycle; nothing is
    /// retried.
    pub async fn publish(&mut self, device: &Device, rng: &mut impl Rng) -> Result<()> {
        for (index, queue) in Queue::PUBLISH_ORDER.into_iter().enumerate() {
            if index > 0 {
                self.pacer.pause(self.pacing).await;
            }

            let now = Local::now().naive_local();
            let reading = device.reading(vitals::signal_for(queue, rng, now), now);
            let payload = codec::encode(&reading, self.format)?;

            debug!("Publishing {} bytes to {} for device {}", payload.len(), queue, device.id());
            self.sink.publish(queue, payload).await?;
        }
        Ok(())
    }
}

/// Publishes cycles for every device until `cycles` rounds are done, or forever
/// when `cycles` is zero. Returns the number of completed rounds.
pub async fn run_cycles<S, P>(
    publisher: &mut Publisher<S, P>,
    devices: &mut [Device],
    cycles: u64,
    rng: &mut impl Rng,
) -> Result<u64>
where
    S: MessageSink,
    P: Pacer,
{
    let mut completed = 0u64;

    while cycles == 0 || completed < cycles {
        for device in devices.iter_mut() {
            publisher.publish(device, rng).await?;
            let status = device.tick(rng);
            debug!(
                "Device {}: battery={} steps={} sleep={:.1}h calories={}",
                device.id(),
                status.battery_level,
                status.step_count,
                status.hours_of_sleep,
                status.calories_burned
            );
        }
        completed += 1;

        if completed % 100 == 0 {
            info!("Published {} cycles", completed);
        }
    }

    Ok(completed)
}
