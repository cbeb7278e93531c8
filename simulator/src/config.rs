use clap::Parser;
use wearable_core::WireFormat;

#[derive(Debug, Clone, Parser)]
#[command(name = "simulator", about = "Simulated wearables publishing vital signs")]
pub struct Args {
    /// Broker host
    #[arg(long, env = "MQTT_BROKER", default_value = "localhost")]
    pub mqtt_broker: String,

    #[arg(long, env = "MQTT_PORT", default_value_t = 1883)]
    pub mqtt_port: u16,

    /// Number of simulated wearables
    #[arg(long, env = "DEVICES", default_value_t = 1)]
    pub devices: usize,

    /// Publish cycles per device, 0 runs until interrupted
    #[arg(long, env = "CYCLES", default_value_t = 0)]
    pub cycles: u64,

    /// Pause between the sends of one cycle
    #[arg(long, env = "PACING_MS", default_value_t = 1000)]
    pub pacing_ms: u64,

    /// `json` or the legacy `flat` text format
    #[arg(long, env = "WIRE_FORMAT", default_value = "json")]
    pub wire_format: WireFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["simulator"]).unwrap();
        assert_eq!(args.mqtt_port, 1883);
        assert_eq!(args.pacing_ms, 1000);
        assert_eq!(args.wire_format, WireFormat::Json);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "simulator",
            "--mqtt-broker",
            "broker.local",
            "--devices",
            "3",
            "--cycles",
            "10",
            "--wire-format",
            "flat",
        ])
        .unwrap();
        assert_eq!(args.mqtt_broker, "broker.local");
        assert_eq!(args.devices, 3);
        assert_eq!(args.cycles, 10);
        assert_eq!(args.wire_format, WireFormat::Flat);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Args::try_parse_from(["simulator", "--wire-format", "xml"]).is_err());
    }
}
