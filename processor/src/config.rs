use crate::mqtt::MqttParams;
use clap::Parser;
use wearable_core::Queue;

#[derive(Debug, Clone, Parser)]
#[command(about = "Consumes one wearable queue and notifies the monitor")]
pub struct ProcessorArgs {
    /// Broker host
    #[arg(long, env = "MQTT_BROKER", default_value = "localhost")]
    pub mqtt_broker: String,

    #[arg(long, env = "MQTT_PORT", default_value_t = 1883)]
    pub mqtt_port: u16,

    /// Session id kept by the broker, defaults to `<queue>-processor`
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// Shared subscription group for competing instances
    #[arg(long, env = "SHARE_GROUP")]
    pub share_group: Option<String>,

    /// Pause between the decision on a record and its acknowledgement
    #[arg(long, env = "SETTLE_MS", default_value_t = 1000)]
    pub settle_ms: u64,

    /// Serve Prometheus metrics on this address, e.g. 0.0.0.0:9100
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<String>,
}

impl ProcessorArgs {
    pub fn mqtt_params(&self, queue: Queue) -> MqttParams {
        MqttParams {
            host: self.mqtt_broker.clone(),
            port: self.mqtt_port,
            client_id: self
                .client_id
                .clone()
                .unwrap_or_else(|| format!("{}-processor", queue)),
            share_group: self.share_group.clone(),
        }
    }
}
