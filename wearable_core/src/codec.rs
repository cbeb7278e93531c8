//! Wire encodings for [`Reading`].
//!
//! Two formats travel on the queues:
//!
//! - `Json`: one JSON object per message, tagged by `topic`, fields keep their
//!   natural types. This is what the simulator publishes by default.
//! - `Flat`: the legacy brace-delimited text (`{'key': 'value', ...}`) still
//!   produced by older wearables. Entries are split on `, ` and `: `, so a
//!   value containing either substring corrupts the record, and every decoded
//!   value is a string that must be coerced by the consumer. It round-trips
//!   for the values the simulator produces (numbers, timestamps, short
//!   identifiers) and nothing more.
//!
//! Consumers accept both: [`decode`] sniffs the first key's quote character.

use crate::errors::{Error, Result};
use crate::model::{DeviceInfo, IntakeTime, Medicine, Reading, Signal, Timestamp};
use crate::queue::Queue;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Decoded flat record: field name to raw string value.
pub type FlatRecord = BTreeMap<String, String>;

const ENTRY_DELIMITER: &str = ", ";
const KEY_DELIMITER: &str = ": ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    #[default]
    Json,
    Flat,
}

impl FromStr for WireFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(WireFormat::Json),
            "flat" => Ok(WireFormat::Flat),
            _ => Err(Error::invalid("wire_format", s)),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Json => f.write_str("json"),
            WireFormat::Flat => f.write_str("flat"),
        }
    }
}

pub fn encode_flat(record: &FlatRecord) -> String {
    let entries: Vec<String> = record
        .iter()
        .map(|(key, value)| format!("'{key}'{KEY_DELIMITER}'{value}'"))
        .collect();
    format!("{{{}}}", entries.join(ENTRY_DELIMITER))
}

pub fn decode_flat(text: &str) -> Result<FlatRecord> {
    let body = text.replace(['{', '}'], "");
    let mut record = FlatRecord::new();
    if body.trim().is_empty() {
        return Ok(record);
    }

    for entry in body.split(ENTRY_DELIMITER) {
        let mut parts = entry.split(KEY_DELIMITER);
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            return Err(Error::MalformedEntry(entry.to_string()));
        };
        record.insert(key.replace('\'', ""), value.replace('\'', ""));
    }
    Ok(record)
}

pub fn encode(reading: &Reading, format: WireFormat) -> Result<Vec<u8>> {
    match format {
        WireFormat::Json => Ok(serde_json::to_vec(reading)?),
        WireFormat::Flat => Ok(encode_flat(&reading.to_flat()).into_bytes()),
    }
}

/// Decodes a payload taken from `queue`, whichever format it was written in.
pub fn decode(queue: Queue, payload: &[u8]) -> Result<Reading> {
    let reading = if looks_like_json(payload) {
        serde_json::from_slice::<Reading>(payload)?
    } else {
        let text = std::str::from_utf8(payload)
            .map_err(|_| Error::invalid("payload", String::from_utf8_lossy(payload)))?;
        Reading::from_flat(queue, &decode_flat(text)?)?
    };

    if reading.queue() != queue {
        return Err(Error::UnexpectedTopic {
            expected: queue.to_string(),
            found: reading.queue().to_string(),
        });
    }
    Ok(reading)
}

fn looks_like_json(payload: &[u8]) -> bool {
    let mut bytes = payload.iter().filter(|b| !b.is_ascii_whitespace());
    matches!((bytes.next(), bytes.next()), (Some(b'{'), Some(b'"' | b'}')))
}

fn field<'a>(record: &'a FlatRecord, name: &str) -> Result<&'a str> {
    record
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::MissingField(name.to_string()))
}

fn parse_field<T: FromStr>(record: &FlatRecord, name: &str) -> Result<T> {
    let raw = field(record, name)?;
    raw.trim().parse().map_err(|_| Error::invalid(name, raw))
}

impl Reading {
    pub fn to_flat(&self) -> FlatRecord {
        let mut record = FlatRecord::new();
        let mut put = |key: &str, value: String| {
            record.insert(key.to_string(), value);
        };

        put("id", self.device.id.clone());
        put("datetime", self.datetime.to_string());
        put("producer", self.device.producer.clone());
        put("model", self.device.model.clone());
        put("hardware_version", self.device.hardware_version.clone());
        put("software_version", self.device.software_version.clone());

        match &self.signal {
            Signal::BodyTemperature { body_temperature } => {
                put("body_temperature", body_temperature.to_string());
            }
            Signal::HeartRate { heart_rate } => put("heart_rate", heart_rate.to_string()),
            Signal::BloodPressure { blood_pressure } => {
                put("blood_pressure", blood_pressure.to_string());
            }
            Signal::Positions {
                x_position,
                y_position,
                z_position,
            } => {
                put("x_position", x_position.to_string());
                put("y_position", y_position.to_string());
                put("z_position", z_position.to_string());
            }
            Signal::Medicine {
                medicine,
                dose,
                first_intake,
                interval_hours,
            } => {
                put("medicine", medicine.to_string());
                put("dose", dose.to_string());
                put("first_intake", first_intake.to_string());
                put("hour", interval_hours.to_string());
            }
        }
        record
    }

    /// Rebuilds a reading from flat fields. The topic is not part of the flat
    /// format; it is implied by the queue the record came from.
    pub fn from_flat(queue: Queue, record: &FlatRecord) -> Result<Self> {
        let device = DeviceInfo {
            id: field(record, "id")?.to_string(),
            producer: field(record, "producer")?.to_string(),
            model: field(record, "model")?.to_string(),
            hardware_version: field(record, "hardware_version")?.to_string(),
            software_version: field(record, "software_version")?.to_string(),
        };
        let datetime = Timestamp::new(field(record, "datetime")?);

        let signal = match queue {
            Queue::BodyTemperature => Signal::BodyTemperature {
                body_temperature: parse_field(record, "body_temperature")?,
            },
            Queue::HeartRate => Signal::HeartRate {
                heart_rate: parse_field(record, "heart_rate")?,
            },
            Queue::BloodPressure => {
                // Older wearables spell the field like the queue.
                let name = if record.contains_key("blood_pressure") {
                    "blood_pressure"
                } else {
                    "blood_preasure"
                };
                Signal::BloodPressure {
                    blood_pressure: parse_field(record, name)?,
                }
            }
            Queue::Positions => Signal::Positions {
                x_position: parse_field(record, "x_position")?,
                y_position: parse_field(record, "y_position")?,
                z_position: parse_field(record, "z_position")?,
            },
            Queue::Medicine => Signal::Medicine {
                medicine: field(record, "medicine")?.parse::<Medicine>()?,
                dose: parse_field(record, "dose")?,
                first_intake: field(record, "first_intake")?.parse::<IntakeTime>()?,
                interval_hours: parse_field(record, "hour")?,
            },
        };

        Ok(Reading {
            device,
            datetime,
            signal,
        })
    }
}
