use crate::vitals;
use chrono::NaiveDateTime;
use rand::Rng;
use wearable_core::{DeviceInfo, Reading, Signal, Timestamp};

const PRODUCER: &str = "Xiaomi";
const MODEL: &str = "Xiaomi My Band 2";
const HARDWARE_VERSION: &str = "2.0.3.2.1";
const SOFTWARE_VERSION: &str = "10.2.3.1";
const INITIAL_BATTERY_LEVEL: u8 = 81;

/// A simulated wearable. Battery and step counters belong to the instance, so
/// several devices in one process never share them.
#[derive(Debug, Clone)]
pub struct Device {
    info: DeviceInfo,
    battery_level: u8,
    step_count: u64,
}

/// Device-side signals that are tracked but not published to any queue.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    pub battery_level: u8,
    pub step_count: u64,
    pub hours_of_sleep: f64,
    pub calories_burned: u32,
}

impl Device {
    pub fn xiaomi_my_band(id: impl Into<String>) -> Self {
        Self {
            info: DeviceInfo {
                id: id.into(),
                producer: PRODUCER.to_string(),
                model: MODEL.to_string(),
                hardware_version: HARDWARE_VERSION.to_string(),
                software_version: SOFTWARE_VERSION.to_string(),
            },
            battery_level: INITIAL_BATTERY_LEVEL,
            step_count: 0,
        }
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// Stamps `signal` with this device's metadata and `now`.
    pub fn reading(&self, signal: Signal, now: NaiveDateTime) -> Reading {
        Reading {
            device: self.info.clone(),
            datetime: Timestamp::from_naive(now),
            signal,
        }
    }

    pub fn battery_level(&self) -> u8 {
        self.battery_level
    }

    pub fn drain_battery(&mut self) -> u8 {
        self.battery_level = self.battery_level.saturating_sub(1);
        self.battery_level
    }

    pub fn count_step(&mut self) -> u64 {
        self.step_count += 1;
        self.step_count
    }

    /// Advances the device counters by one heartbeat.
    pub fn tick(&mut self, rng: &mut impl Rng) -> DeviceStatus {
        DeviceStatus {
            battery_level: self.drain_battery(),
            step_count: self.count_step(),
            hours_of_sleep: vitals::hours_of_sleep(rng),
            calories_burned: vitals::calories_burned(rng),
        }
    }
}
