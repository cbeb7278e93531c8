//! Randomised vital signs. Values are uniform within fixed ranges; none of
//! this models real sensor behaviour.

use chrono::{NaiveDateTime, Timelike};
use rand::Rng;
use std::ops::RangeInclusive;
use wearable_core::{IntakeTime, Medicine, Queue, Signal};

pub const BODY_TEMPERATURE: RangeInclusive<f64> = 67.0..=72.0;
pub const HEART_RATE: RangeInclusive<u32> = 60..=150;
pub const BLOOD_PRESSURE: RangeInclusive<u32> = 100..=200;
pub const AXIS_POSITION: RangeInclusive<f64> = 0.0..=1.0;
pub const DOSE: RangeInclusive<u32> = 1..=2;
pub const DOSE_INTERVALS: [u32; 3] = [8, 12, 24];
pub const CALORIES_BURNED: RangeInclusive<u32> = 1500..=2500;

pub fn body_temperature(rng: &mut impl Rng) -> f64 {
    rng.gen_range(BODY_TEMPERATURE)
}

pub fn heart_rate(rng: &mut impl Rng) -> u32 {
    rng.gen_range(HEART_RATE)
}

pub fn blood_pressure(rng: &mut impl Rng) -> u32 {
    rng.gen_range(BLOOD_PRESSURE)
}

pub fn axis_position(rng: &mut impl Rng) -> f64 {
    rng.gen_range(AXIS_POSITION)
}

pub fn medicine(rng: &mut impl Rng) -> Medicine {
    Medicine::ALL[rng.gen_range(0..Medicine::ALL.len())]
}

pub fn dose(rng: &mut impl Rng) -> u32 {
    rng.gen_range(DOSE)
}

/// First intake happened earlier today: a random hour up to the current one,
/// at the current minute.
pub fn first_intake(rng: &mut impl Rng, now: NaiveDateTime) -> IntakeTime {
    IntakeTime {
        hour: rng.gen_range(0..=now.hour()),
        minute: now.minute(),
    }
}

pub fn dose_interval(rng: &mut impl Rng) -> u32 {
    DOSE_INTERVALS[rng.gen_range(0..DOSE_INTERVALS.len())]
}

pub fn hours_of_sleep(rng: &mut impl Rng) -> f64 {
    10.0 - rng.gen_range(0.0..=3.0)
}

pub fn calories_burned(rng: &mut impl Rng) -> u32 {
    rng.gen_range(CALORIES_BURNED)
}

/// Fresh topic values for `queue`.
pub fn signal_for(queue: Queue, rng: &mut impl Rng, now: NaiveDateTime) -> Signal {
    match queue {
        Queue::BodyTemperature => Signal::BodyTemperature {
            body_temperature: body_temperature(rng),
        },
        Queue::HeartRate => Signal::HeartRate {
            heart_rate: heart_rate(rng),
        },
        Queue::BloodPressure => Signal::BloodPressure {
            blood_pressure: blood_pressure(rng),
        },
        Queue::Positions => Signal::Positions {
            x_position: axis_position(rng),
            y_position: axis_position(rng),
            z_position: axis_position(rng),
        },
        Queue::Medicine => Signal::Medicine {
            medicine: medicine(rng),
            dose: dose(rng),
            first_intake: first_intake(rng, now),
            interval_hours: dose_interval(rng),
        },
    }
}
