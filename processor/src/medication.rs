//! Medication schedule check.
//!
//! The check compares the record's own timestamp (when the wearable produced
//! it, not when it is consumed) with a single wrapped dose time:
//!
//! ```text
//! scheduled_hour = |first_intake.hour + interval - 24|
//! ```
//!
//! A dose is due when `scheduled_hour` equals the record's hour and the first
//! intake minute equals the record's minute. This is one wrapped slot, not a
//! repeating schedule across the day. With a 24h interval the slot is the
//! intake hour itself; with 8h or 12h it is usually not `first_intake +
//! interval` (a 06:30 intake every 8 hours is due at 10:30, not 14:30).

use crate::consumer::{Handler, Outcome};
use crate::monitor::{MedicationNotice, Monitor};
use wearable_core::{Error, Queue, Reading, Result, Signal};

pub fn scheduled_hour(first_intake_hour: u32, interval_hours: u32) -> u64 {
    (u64::from(first_intake_hour) + u64::from(interval_hours)).abs_diff(24)
}

/// Returns the notice to raise when the record falls on its scheduled dose.
pub fn due_dose(reading: &Reading) -> Result<Option<MedicationNotice>> {
    let Signal::Medicine {
        medicine,
        dose,
        first_intake,
        interval_hours,
    } = &reading.signal
    else {
        return Err(Error::UnexpectedTopic {
            expected: Queue::Medicine.to_string(),
            found: reading.queue().to_string(),
        });
    };

    let (hour, minute) = reading.datetime.clock()?;
    if scheduled_hour(first_intake.hour, *interval_hours) != u64::from(hour) || first_intake.minute != minute {
        return Ok(None);
    }

    Ok(Some(MedicationNotice {
        datetime: reading.datetime.clone(),
        id: reading.device.id.clone(),
        dose: *dose,
        medicine: *medicine,
        model: reading.device.model.clone(),
        interval_hours: *interval_hours,
    }))
}

pub struct MedicationHandler<M> {
    monitor: M,
}

impl<M: Monitor> MedicationHandler<M> {
    pub fn new(monitor: M) -> Self {
        Self { monitor }
    }
}

impl<M: Monitor> Handler for MedicationHandler<M> {
    fn handle(&mut self, reading: &Reading) -> Result<Outcome> {
        match due_dose(reading)? {
            Some(notice) => {
                self.monitor.notify_medication(&notice);
                Ok(Outcome::Notified)
            }
            None => Ok(Outcome::Quiet),
        }
    }
}
