//! Fall detection on accelerometer readings.
//!
//! At rest the three axes read roughly (0, 1, 0). A plain sum above 2 means a
//! stronger force than that, most likely a fall.

use crate::consumer::{Handler, Outcome};
use crate::monitor::{Monitor, ThresholdNotice};
use wearable_core::{Error, Queue, Reading, Result, Signal};

/// Exclusive: a sum of exactly 2 does not notify.
pub const MOVEMENT_THRESHOLD: f64 = 2.0;
pub const MOVEMENT_LABEL: &str = "movimiento";

pub fn axis_sum(x: f64, y: f64, z: f64) -> f64 {
    x + y + z
}

pub fn detect(reading: &Reading) -> Result<Option<ThresholdNotice>> {
    let Signal::Positions {
        x_position,
        y_position,
        z_position,
    } = reading.signal
    else {
        return Err(Error::UnexpectedTopic {
            expected: Queue::Positions.to_string(),
            found: reading.queue().to_string(),
        });
    };

    let sum = axis_sum(x_position, y_position, z_position);
    if sum <= MOVEMENT_THRESHOLD {
        return Ok(None);
    }

    Ok(Some(ThresholdNotice {
        datetime: reading.datetime.clone(),
        id: reading.device.id.clone(),
        value: sum,
        label: MOVEMENT_LABEL.to_string(),
        model: reading.device.model.clone(),
    }))
}

pub struct MovementHandler<M> {
    monitor: M,
}

impl<M: Monitor> MovementHandler<M> {
    pub fn new(monitor: M) -> Self {
        Self { monitor }
    }
}

impl<M: Monitor> Handler for MovementHandler<M> {
    fn handle(&mut self, reading: &Reading) -> Result<Outcome> {
        match detect(reading)? {
            Some(notice) => {
                self.monitor.notify_threshold(&notice);
                Ok(Outcome::Notified)
            }
            None => Ok(Outcome::Quiet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{Notification, RecordingMonitor};
    use wearable_core::{DeviceInfo, Timestamp};

    fn reading(x: f64, y: f64, z: f64) -> Reading {
        Reading {
            device: DeviceInfo {
                id: "9".to_string(),
                producer: "Xiaomi".to_string(),
                model: "Xiaomi My Band 2".to_string(),
                hardware_version: "2.0.3.2.1".to_string(),
                software_version: "10.2.3.1".to_string(),
            },
            datetime: Timestamp::new("18:10:2026:21:04:59"),
            signal: Signal::Positions {
                x_position: x,
                y_position: y,
                z_position: z,
            },
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(detect(&reading(1.0, 1.0, 0.0)).unwrap(), None);
        assert!(detect(&reading(1.0, 1.0, 0.0001)).unwrap().is_some());
    }

    #[test]
    fn test_resting_position_is_quiet() {
        assert_eq!(detect(&reading(0.02, 0.98, 0.05)).unwrap(), None);
    }

    #[test]
    fn test_notice_fields() {
        let notice = detect(&reading(0.9, 0.8, 0.7)).unwrap().unwrap();
        assert!((notice.value - 2.4).abs() < 1e-9);
        assert_eq!(notice.label, "movimiento");
        assert_eq!(notice.id, "9");
        assert_eq!(notice.model, "Xiaomi My Band 2");
        assert_eq!(notice.datetime.as_str(), "18:10:2026:21:04:59");
    }

    #[test]
    fn test_rejects_other_topics() {
        let mut reading = reading(1.0, 1.0, 1.0);
        reading.signal = Signal::BloodPressure { blood_pressure: 150 };
        assert!(detect(&reading).is_err());
    }

    #[test]
    fn test_handler_notifies_monitor() {
        let monitor = RecordingMonitor::default();
        let mut handler = MovementHandler::new(monitor.clone());

        assert_eq!(handler.handle(&reading(1.0, 1.0, 1.0)).unwrap(), Outcome::Notified);
        assert_eq!(handler.handle(&reading(0.1, 0.1, 0.1)).unwrap(), Outcome::Quiet);

        let notifications = monitor.notifications();
        assert_eq!(notifications.len(), 1);
        assert!(matches!(&notifications[0], Notification::Threshold(n) if n.value == 3.0));
    }
}
