pub mod config;
pub mod device;
pub mod mqtt;
pub mod publisher;
pub mod vitals;

pub use device::{Device, DeviceStatus};
pub use publisher::{run_cycles, Publisher, DEFAULT_PACING};
