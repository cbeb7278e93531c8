//! Notifications handed to the operator-facing monitor.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;
use wearable_core::{Medicine, Timestamp};

/// A reading crossed a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdNotice {
    pub datetime: Timestamp,
    pub id: String,
    pub value: f64,
    pub label: String,
    pub model: String,
}

/// A scheduled dose is due.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationNotice {
    pub datetime: Timestamp,
    pub id: String,
    pub dose: u32,
    pub medicine: Medicine,
    pub model: String,
    pub interval_hours: u32,
}

pub trait Monitor {
    fn notify_threshold(&mut self, notice: &ThresholdNotice);
    fn notify_medication(&mut self, notice: &MedicationNotice);
}

/// Renders notifications as log events under the `monitor` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMonitor;

impl Monitor for LogMonitor {
    fn notify_threshold(&mut self, notice: &ThresholdNotice) {
        warn!(
            target: "monitor",
            "[{}] device {} ({}): {} value {:.3}",
            notice.datetime, notice.id, notice.model, notice.label, notice.value
        );
    }

    fn notify_medication(&mut self, notice: &MedicationNotice) {
        warn!(
            target: "monitor",
            "[{}] device {} ({}): {} due, dose {} every {}h",
            notice.datetime,
            notice.id,
            notice.model,
            notice.medicine,
            notice.dose,
            notice.interval_hours
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Threshold(ThresholdNotice),
    Medication(MedicationNotice),
}

/// Keeps every notification; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingMonitor {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingMonitor {
    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(&self, notification: Notification) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl Monitor for RecordingMonitor {
    fn notify_threshold(&mut self, notice: &ThresholdNotice) {
        self.push(Notification::Threshold(notice.clone()));
    }

    fn notify_medication(&mut self, notice: &MedicationNotice) {
        self.push(Notification::Medication(notice.clone()));
    }
}
