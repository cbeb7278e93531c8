use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Durable queues fed by the wearable. Each queue carries records of one schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Queue {
    BodyTemperature,
    HeartRate,
    BloodPressure,
    Positions,
    Medicine,
}

impl Queue {
    /// Order in which a publish cycle emits its records.
    pub const PUBLISH_ORDER: [Queue; 5] = [
        Queue::BodyTemperature,
        Queue::HeartRate,
        Queue::BloodPressure,
        Queue::Positions,
        Queue::Medicine,
    ];

    /// Broker-side queue name. `blood_preasure` is the name deployed consumers
    /// already bind to, so it keeps its spelling.
    pub fn name(self) -> &'static str {
        match self {
            Queue::BodyTemperature => "body_temperature",
            Queue::HeartRate => "heart_rate",
            Queue::BloodPressure => "blood_preasure",
            Queue::Positions => "positions",
            Queue::Medicine => "medicine",
        }
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Queue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Queue::PUBLISH_ORDER
            .into_iter()
            .find(|queue| queue.name() == s)
            .ok_or_else(|| Error::UnknownQueue(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_names_parse_back() {
        for queue in Queue::PUBLISH_ORDER {
            assert_eq!(queue.name().parse::<Queue>().unwrap(), queue);
        }
    }

    #[test]
    fn test_blood_pressure_queue_keeps_deployed_name() {
        assert_eq!(Queue::BloodPressure.to_string(), "blood_preasure");
        assert!("blood_pressure".parse::<Queue>().is_err());
    }
}
