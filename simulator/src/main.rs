use clap::Parser;
use simulator::config::Args;
use simulator::mqtt::{BrokerParams, MqttSink};
use simulator::{run_cycles, Device, Publisher};
use std::time::Duration;
use tracing::{error, info};
use wearable_core::pacing::TokioPacer;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting wearable simulator");
    info!(
        "Broker: {}:{}, Devices: {}, Wire format: {}, Pacing: {}ms",
        args.mqtt_broker, args.mqtt_port, args.devices, args.wire_format, args.pacing_ms
    );

    let sink = MqttSink::new(BrokerParams {
        host: args.mqtt_broker.clone(),
        port: args.mqtt_port,
    });
    let mut publisher = Publisher::new(sink, TokioPacer, args.wire_format)
        .with_pacing(Duration::from_millis(args.pacing_ms));
    let mut devices: Vec<Device> = (0..args.devices)
        .map(|id| Device::xiaomi_my_band(id.to_string()))
        .collect();
    let mut rng = rand::thread_rng();

    tokio::select! {
        result = run_cycles(&mut publisher, &mut devices, args.cycles, &mut rng) => {
            match result {
                Ok(cycles) => info!("Completed {} publish cycles", cycles),
                Err(e) => {
                    error!("Publish cycle failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down");
}
