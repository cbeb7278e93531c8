use crate::errors::{Error, Result};
use crate::queue::Queue;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format of the `datetime` field carried by every record.
pub const DATETIME_FORMAT: &str = "%d:%m:%Y:%H:%M:%S";

/// Static descriptors of the emitting device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub producer: String,
    pub model: String,
    pub hardware_version: String,
    pub software_version: String,
}

/// `DD:MM:YYYY:HH:MM:SS` timestamp taken on the device when the record was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_naive(at: NaiveDateTime) -> Self {
        Self(at.format(DATETIME_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hour and minute read by position (characters 11-12 and 14-15).
    pub fn clock(&self) -> Result<(u32, u32)> {
        let field = |range: std::ops::Range<usize>| -> Result<u32> {
            self.0
                .get(range)
                .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse().ok())
                .ok_or_else(|| Error::invalid("datetime", self.0.as_str()))
        };
        let hour = field(11..13)?;
        let minute = field(14..16)?;
        if hour > 23 || minute > 59 {
            return Err(Error::invalid("datetime", self.0.as_str()));
        }
        Ok((hour, minute))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Time of the first intake of a medicine, `HH:MM` on the wire.
///
/// Parsing accepts a single-digit hour as well, which is what older
/// producers emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IntakeTime {
    pub hour: u32,
    pub minute: u32,
}

impl IntakeTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::invalid("first_intake", format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }
}

impl FromStr for IntakeTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::invalid("first_intake", s);
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let parse = |part: &str| -> Result<u32> {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        IntakeTime::new(parse(hour)?, parse(minute)?)
    }
}

impl TryFrom<String> for IntakeTime {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<IntakeTime> for String {
    fn from(value: IntakeTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for IntakeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medicine {
    Paracetamol,
    Ibuprofeno,
    Insulina,
    Furosemida,
    Piroxicam,
    Tolbutamida,
}

impl Medicine {
    pub const ALL: [Medicine; 6] = [
        Medicine::Paracetamol,
        Medicine::Ibuprofeno,
        Medicine::Insulina,
        Medicine::Furosemida,
        Medicine::Piroxicam,
        Medicine::Tolbutamida,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Medicine::Paracetamol => "Paracetamol",
            Medicine::Ibuprofeno => "Ibuprofeno",
            Medicine::Insulina => "Insulina",
            Medicine::Furosemida => "Furosemida",
            Medicine::Piroxicam => "Piroxicam",
            Medicine::Tolbutamida => "Tolbutamida",
        }
    }
}

impl fmt::Display for Medicine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Medicine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Medicine::ALL
            .into_iter()
            .find(|medicine| medicine.name() == s)
            .ok_or_else(|| Error::invalid("medicine", s))
    }
}

/// Topic-specific part of a record, tagged by topic name on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum Signal {
    BodyTemperature {
        body_temperature: f64,
    },
    HeartRate {
        heart_rate: u32,
    },
    BloodPressure {
        blood_pressure: u32,
    },
    Positions {
        x_position: f64,
        y_position: f64,
        z_position: f64,
    },
    Medicine {
        medicine: Medicine,
        dose: u32,
        first_intake: IntakeTime,
        /// Hours between intakes.
        #[serde(rename = "hour")]
        interval_hours: u32,
    },
}

impl Signal {
    pub fn queue(&self) -> Queue {
        match self {
            Signal::BodyTemperature { .. } => Queue::BodyTemperature,
            Signal::HeartRate { .. } => Queue::HeartRate,
            Signal::BloodPressure { .. } => Queue::BloodPressure,
            Signal::Positions { .. } => Queue::Positions,
            Signal::Medicine { .. } => Queue::Medicine,
        }
    }
}

/// One reading emitted by the wearable: device metadata, timestamp and the
/// topic-specific values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(flatten)]
    pub device: DeviceInfo,
    pub datetime: Timestamp,
    #[serde(flatten)]
    pub signal: Signal,
}

impl Reading {
    pub fn queue(&self) -> Queue {
        self.signal.queue()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_timestamp_format_and_clock() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        let ts = Timestamp::from_naive(at);
        assert_eq!(ts.as_str(), "07:03:2024:14:30:05");
        assert_eq!(ts.clock().unwrap(), (14, 30));
    }

    #[test]
    fn test_timestamp_clock_rejects_short_or_garbled() {
        assert!(Timestamp::new("07:03:2024").clock().is_err());
        assert!(Timestamp::new("07:03:2024:1x:30:05").clock().is_err());
        assert!(Timestamp::new("07:03:2024:25:30:05").clock().is_err());
    }

    #[test]
    fn test_intake_time_parsing() {
        assert_eq!("06:30".parse::<IntakeTime>().unwrap(), IntakeTime::new(6, 30).unwrap());
        assert_eq!("6:05".parse::<IntakeTime>().unwrap().to_string(), "06:05");
        assert!("24:00".parse::<IntakeTime>().is_err());
        assert!("0630".parse::<IntakeTime>().is_err());
        assert!(":30".parse::<IntakeTime>().is_err());
    }

    #[test]
    fn test_medicine_names() {
        for medicine in Medicine::ALL {
            assert_eq!(medicine.name().parse::<Medicine>().unwrap(), medicine);
        }
        assert!("Aspirina".parse::<Medicine>().is_err());
    }

    #[test]
    fn test_signal_queue() {
        let signal = Signal::Positions {
            x_position: 0.1,
            y_position: 0.2,
            z_position: 0.3,
        };
        assert_eq!(signal.queue(), Queue::Positions);
    }
}
