use rumqttc::{AsyncClient, Event, MqttOptions, Outgoing, Packet, QoS};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;
use wearable_core::broker::MessageSink;
use wearable_core::{Error, Queue, Result};

/// Where the broker lives.
#[derive(Debug, Clone)]
pub struct BrokerParams {
    pub host: String,
    pub port: u16,
}

/// Publishes every record over its own MQTT connection: connect, publish with
/// QoS 1, wait for the PUBACK, disconnect. Connection errors are returned as
/// they happen; there is no reconnect.
#[derive(Debug, Clone)]
pub struct MqttSink {
    params: BrokerParams,
}

impl MqttSink {
    pub fn new(params: BrokerParams) -> Self {
        Self { params }
    }
}

impl MessageSink for MqttSink {
    async fn publish(&mut self, queue: Queue, payload: Vec<u8>) -> Result<()> {
        let client_id = format!("sim-{}", Uuid::new_v4());
        let mut mqtt_options = MqttOptions::new(client_id, &self.params.host, self.params.port);
        mqtt_options.set_keep_alive(Duration::from_secs(30));
        mqtt_options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(mqtt_options, 10);

        client
            .publish(queue.name(), QoS::AtLeastOnce, false, payload)
            .await
            .map_err(Error::broker)?;

        loop {
            match eventloop.poll().await.map_err(Error::broker)? {
                Event::Incoming(Packet::ConnAck(_)) => {
                    debug!("Connected to {}:{}", self.params.host, self.params.port);
                }
                Event::Incoming(Packet::PubAck(_)) => break,
                _ => {}
            }
        }

        client.disconnect().await.map_err(Error::broker)?;
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                Ok(_) => {}
                Err(e) => {
                    // Broker hung up first; the publish was already acknowledged.
                    debug!("Connection ended during disconnect: {}", e);
                    break;
                }
            }
        }

        debug!("Broker acknowledged record on {}", queue);
        Ok(())
    }
}
