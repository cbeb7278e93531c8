//! Needs an MQTT broker on localhost:1883, e.g. `docker run -p 1883:1883 eclipse-mosquitto`.
//! Run with `cargo test -p processor --test live_broker -- --ignored`.

use processor::mqtt::{MqttParams, MqttSource};
use processor::{Consumer, MovementHandler, RecordingMonitor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simulator::mqtt::{BrokerParams, MqttSink};
use simulator::{Device, Publisher};
use std::time::{Duration, Instant};
use wearable_core::pacing::TokioPacer;
use wearable_core::{Queue, WireFormat};

#[tokio::test]
#[ignore]
async fn test_round_trip_through_local_broker() {
    let params = MqttParams {
        host: "localhost".to_string(),
        port: 1883,
        client_id: format!("positions-live-{}", std::process::id()),
        share_group: None,
    };
    // Subscribe first so the session holds the records published below.
    let source = MqttSource::connect(&params, Queue::Positions).await.unwrap();

    let sink = MqttSink::new(BrokerParams {
        host: "localhost".to_string(),
        port: 1883,
    });
    let mut publisher =
        Publisher::new(sink, TokioPacer, WireFormat::Json).with_pacing(Duration::from_millis(50));
    let mut rng = StdRng::seed_from_u64(1);
    let devices: Vec<Device> = (1..=5).map(|id| Device::xiaomi_my_band(id.to_string())).collect();

    let start = Instant::now();
    for device in &devices {
        publisher.publish(device, &mut rng).await.unwrap();
    }
    println!("Published {} cycles in {:?}", devices.len(), start.elapsed());

    let monitor = RecordingMonitor::default();
    let summary = Consumer::new(source, MovementHandler::new(monitor.clone()), TokioPacer)
        .with_settle(Duration::from_millis(10))
        .run(tokio::time::sleep(Duration::from_secs(3)))
        .await
        .unwrap();

    println!("Consumer summary: {:?}", summary);
    assert!(summary.received >= devices.len() as u64);
    assert_eq!(summary.acknowledged, summary.received);
    assert_eq!(monitor.notifications().len() as u64, summary.notified);
}
