use rumqttc::v5::mqttbytes::v5::{ConnectProperties, Packet, Publish};
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{AsyncClient, Event, EventLoop, MqttOptions};
use rumqttc::Outgoing;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info};
use wearable_core::broker::{Delivery, MessageSource};
use wearable_core::{Error, Queue, Result};

/// Session expiry meaning "never" in MQTT 5.
const SESSION_NEVER_EXPIRES: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct MqttParams {
    pub host: String,
    pub port: u16,
    /// Must stay the same across restarts: the broker keeps the session, and
    /// with it every unacknowledged record, under this id.
    pub client_id: String,
    /// Instances in the same group share the queue's records between them.
    pub share_group: Option<String>,
}

pub fn subscription_topic(queue: Queue, share_group: Option<&str>) -> String {
    match share_group {
        Some(group) => format!("$share/{}/{}", group, queue.name()),
        None => queue.name().to_string(),
    }
}

/// Durable QoS 1 subscription to one queue with manual acknowledgements, over
/// MQTT 5.
///
/// The session never expires and is resumed (`clean_start = false`), so
/// records delivered but not acknowledged are sent again when a consumer with
/// the same client id reconnects. `receive_maximum = 1` makes the broker hold
/// back the next record until the current one is acked.
pub struct MqttSource {
    client: AsyncClient,
    eventloop: EventLoop,
    queue: Queue,
    backlog: VecDeque<Publish>,
}

fn mqtt_options(params: &MqttParams) -> MqttOptions {
    let mut mqtt_options = MqttOptions::new(params.client_id.clone(), params.host.clone(), params.port);
    mqtt_options.set_keep_alive(Duration::from_secs(30));
    mqtt_options.set_clean_start(false);
    mqtt_options.set_manual_acks(true);

    let mut properties = ConnectProperties::new();
    properties.session_expiry_interval = Some(SESSION_NEVER_EXPIRES);
    mqtt_options.set_connect_properties(properties);
    mqtt_options.set_receive_maximum(Some(1));
    mqtt_options
}

impl MqttSource {
    /// Connects and subscribes. Connection failures are returned as is.
    pub async fn connect(params: &MqttParams, queue: Queue) -> Result<Self> {
        info!("Connecting to MQTT broker at {}:{}", params.host, params.port);

        let (client, mut eventloop) = AsyncClient::new(mqtt_options(params), 10);

        let topic = subscription_topic(queue, params.share_group.as_deref());
        client
            .subscribe(topic.as_str(), QoS::AtLeastOnce)
            .await
            .map_err(Error::broker)?;

        // A session redelivery may arrive before the SUBACK.
        let mut backlog = VecDeque::new();
        loop {
            match eventloop.poll().await.map_err(Error::broker)? {
                Event::Incoming(Packet::SubAck(_)) => break,
                Event::Incoming(Packet::Publish(publish)) => backlog.push_back(publish),
                _ => {}
            }
        }

        info!("Subscribed to {} with QoS 1", topic);

        Ok(Self {
            client,
            eventloop,
            queue,
            backlog,
        })
    }
}

fn delivery(publish: Publish) -> Delivery<Publish> {
    Delivery {
        payload: publish.payload.to_vec(),
        redelivered: publish.dup,
        handle: publish,
    }
}

impl MessageSource for MqttSource {
    type Handle = Publish;

    fn queue(&self) -> Queue {
        self.queue
    }

    async fn receive(&mut self) -> Result<Delivery<Publish>> {
        if let Some(publish) = self.backlog.pop_front() {
            return Ok(delivery(publish));
        }

        loop {
            match self.eventloop.poll().await.map_err(Error::broker)? {
                Event::Incoming(Packet::Publish(publish)) => {
                    debug!(
                        "Received message on topic {}, size: {} bytes",
                        String::from_utf8_lossy(&publish.topic),
                        publish.payload.len()
                    );
                    return Ok(delivery(publish));
                }
                Event::Incoming(Packet::Disconnect(_)) => return Err(Error::Closed),
                _ => {}
            }
        }
    }

    async fn acknowledge(&mut self, handle: Publish) -> Result<()> {
        // Queued here, written out by the next event loop poll.
        self.client.ack(&handle).await.map_err(Error::broker)
    }

    /// Acks already queued go out before the DISCONNECT.
    async fn close(&mut self) -> Result<()> {
        self.client.disconnect().await.map_err(Error::broker)?;
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("Connection ended during disconnect: {}", e);
                    break;
                }
            }
        }
        info!("Disconnected from MQTT broker");
        Ok(())
    }
}
