//! Subscriber services for the wearable queues: a medication schedule checker
//! on `medicine` and a fall detector on `positions`.

pub mod config;
pub mod consumer;
pub mod medication;
pub mod metrics;
pub mod monitor;
pub mod movement;
pub mod mqtt;
pub mod service;

pub use consumer::{Consumer, Handler, Outcome, RunSummary};
pub use medication::MedicationHandler;
pub use monitor::{LogMonitor, Monitor, RecordingMonitor};
pub use movement::MovementHandler;
