//! Shared pieces of the wearable pipeline: the reading model, its wire
//! encodings, queue names and the broker capabilities used by the simulator
//! and the processors.

pub mod broker;
pub mod codec;
pub mod errors;
pub mod model;
pub mod pacing;
pub mod queue;

pub use codec::WireFormat;
pub use errors::{Error, Result};
pub use model::{DeviceInfo, IntakeTime, Medicine, Reading, Signal, Timestamp};
pub use queue::Queue;
