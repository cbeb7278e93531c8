use processor::monitor::Notification;
use processor::{Consumer, MedicationHandler, MovementHandler, RecordingMonitor, RunSummary};
use wearable_core::broker::{MemoryBroker, MessageSource};
use wearable_core::pacing::RecordingPacer;
use wearable_core::{codec, DeviceInfo, IntakeTime, Medicine, Queue, Reading, Signal, Timestamp, WireFormat};

fn device() -> DeviceInfo {
    DeviceInfo {
        id: "21".to_string(),
        producer: "Xiaomi".to_string(),
        model: "Xiaomi My Band 2".to_string(),
        hardware_version: "2.0.3.2.1".to_string(),
        software_version: "10.2.3.1".to_string(),
    }
}

fn fall() -> Vec<u8> {
    let reading = Reading {
        device: device(),
        datetime: Timestamp::new("18:10:2026:03:12:45"),
        signal: Signal::Positions {
            x_position: 0.9,
            y_position: 0.95,
            z_position: 0.6,
        },
    };
    codec::encode(&reading, WireFormat::Json).unwrap()
}

fn due_insulin() -> Vec<u8> {
    let reading = Reading {
        device: device(),
        datetime: Timestamp::new("18:10:2026:10:30:00"),
        signal: Signal::Medicine {
            medicine: Medicine::Insulina,
            dose: 1,
            first_intake: IntakeTime::new(10, 30).unwrap(),
            interval_hours: 24,
        },
    };
    codec::encode(&reading, WireFormat::Flat).unwrap()
}

#[test]
fn test_crash_before_ack_redelivers_to_next_instance() {
    tokio_test::block_on(async {
        let broker = MemoryBroker::new();
        broker.publish_to(Queue::Positions, fall());

        // First instance decodes the record and dies before acknowledging.
        let mut crashed = broker.subscribe(Queue::Positions);
        let delivery = crashed.receive().await.unwrap();
        assert!(codec::decode(Queue::Positions, &delivery.payload).is_ok());
        drop(crashed);
        assert_eq!(broker.pending(Queue::Positions), 1);

        let monitor = RecordingMonitor::default();
        let consumer = Consumer::new(
            broker.subscribe(Queue::Positions),
            MovementHandler::new(monitor.clone()),
            RecordingPacer::default(),
        );
        let summary = consumer.run(broker.drained(Queue::Positions)).await.unwrap();

        assert_eq!(
            summary,
            RunSummary {
                received: 1,
                notified: 1,
                acknowledged: 1,
            }
        );
        let notifications = monitor.notifications();
        assert!(matches!(
            &notifications[..],
            [Notification::Threshold(n)] if n.id == "21" && n.label == "movimiento"
        ));
    });
}

#[test]
fn test_shutdown_during_settle_leaves_record_unacknowledged() {
    tokio_test::block_on(async {
        let broker = MemoryBroker::new();
        broker.publish_to(Queue::Medicine, due_insulin());

        // The shutdown fires once the record is in flight, i.e. while the
        // consumer is between its decision and the ack.
        let watcher = broker.clone();
        let shutdown = async move {
            while watcher.in_flight(Queue::Medicine) == 0 {
                tokio::task::yield_now().await;
            }
        };

        let first = RecordingMonitor::default();
        let consumer = Consumer::new(
            broker.subscribe(Queue::Medicine),
            MedicationHandler::new(first.clone()),
            RecordingPacer::default(),
        );
        let summary = consumer.run(shutdown).await.unwrap();
        assert_eq!(summary.acknowledged, 0);
        assert_eq!(first.notifications().len(), 1);
        assert_eq!(broker.pending(Queue::Medicine), 1);

        // No idempotence guard: the next instance notifies again.
        let second = RecordingMonitor::default();
        let consumer = Consumer::new(
            broker.subscribe(Queue::Medicine),
            MedicationHandler::new(second.clone()),
            RecordingPacer::default(),
        );
        let summary = consumer.run(broker.drained(Queue::Medicine)).await.unwrap();
        assert_eq!(summary.acknowledged, 1);
        assert!(matches!(
            &second.notifications()[..],
            [Notification::Medication(n)] if n.medicine == Medicine::Insulina && n.dose == 1
        ));
    });
}

#[test]
fn test_poison_record_keeps_coming_back() {
    tokio_test::block_on(async {
        let broker = MemoryBroker::new();
        broker.publish_to(Queue::Medicine, b"{'medicine': 'Insulina', 'dose': 'uno'}".to_vec());

        for _ in 0..3 {
            let consumer = Consumer::new(
                broker.subscribe(Queue::Medicine),
                MedicationHandler::new(RecordingMonitor::default()),
                RecordingPacer::default(),
            );
            assert!(consumer.run(std::future::pending::<()>()).await.is_err());
            assert_eq!(broker.pending(Queue::Medicine), 1);
        }
    });
}
