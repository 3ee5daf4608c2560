use crate::entity::{Component, EntityError, EntityInfo};
use crate::hass::{DeviceIdentity, Discovery, PAYLOAD_OFFLINE, PAYLOAD_ONLINE};
use crate::topic::{self, EntityKind};
use crate::transport::{LastWill, Transport};

const AVAILABILITY_ID: &str = "status";
const AVAILABILITY_NAME: &str = "Status";

/// Connectivity beacon of the whole device.
///
/// Announced as a `connectivity` binary sensor whose state topic doubles as
/// the broker last will topic: `online` once connected, `offline` published
/// by the broker when the connection drops.
#[derive(Debug, Clone)]
pub struct Availability {
    info: EntityInfo,
}

impl Availability {
    pub fn new() -> Self {
        Self {
            info: EntityInfo::new(AVAILABILITY_ID, AVAILABILITY_NAME),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.info.set_icon(icon);
        self
    }

    /// Same as the state topic. Empty until initialized.
    pub fn will_topic(&self) -> &str {
        self.info.state_topic()
    }

    pub fn last_will(&self) -> Result<LastWill, EntityError> {
        if !self.info.is_initialized() {
            return Err(EntityError::NotInitialized { id: self.info.id().to_string() });
        }
        Ok(LastWill {
            topic: self.will_topic().to_string(),
            payload: PAYLOAD_OFFLINE.to_string(),
            qos: 0,
            retain: true,
        })
    }

    pub fn report_online(&self, transport: &mut dyn Transport) -> Result<(), EntityError> {
        self.info.publish_state(transport, PAYLOAD_ONLINE, true)
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Availability {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut EntityInfo {
        &mut self.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::BinarySensor
    }

    fn initialize(&mut self, device: &DeviceIdentity) {
        let state_topic = topic::device_topic(&device.name, self.info.id());
        self.info.set_state_topic(state_topic);
    }

    fn config_payload(&self, discovery: &mut Discovery) {
        discovery.payload_on = Some(PAYLOAD_ONLINE.to_string());
        discovery.payload_off = Some(PAYLOAD_OFFLINE.to_string());
        discovery.device_class = Some("connectivity".to_string());
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::{Component, EntityError};
    use crate::hass::DeviceIdentity;
    use crate::transport::testing::RecordingTransport;
    use super::Availability;

    fn identity() -> DeviceIdentity {
        DeviceIdentity {
            name: "shed".to_string(),
            friendly_name: "Shed".to_string(),
            sw_version: "1.1".to_string(),
            model: "d1".to_string(),
            manufacturer: "Acme".to_string(),
            identifier: "aa:aa:aa:aa:aa:aa".to_string(),
        }
    }

    #[test]
    fn test_availability_topics_and_will() {
        let mut status = Availability::new();
        assert!(matches!(status.last_will(), Err(EntityError::NotInitialized { .. })));

        status.initialize(&identity());
        assert_eq!(status.will_topic(), "shed/status");
        let will = status.last_will().unwrap();
        assert_eq!(will.topic, "shed/status");
        assert_eq!(will.payload, "offline");
        assert_eq!(will.qos, 0);
        assert!(will.retain);
    }

    #[test]
    fn test_availability_discovery() {
        let mut transport = RecordingTransport::new();
        let mut status = Availability::new();
        status.initialize(&identity());
        status.publish_config(&identity(), "homeassistant", &mut transport, true).unwrap();

        assert_eq!(transport.topics(), vec!["homeassistant/binary_sensor/shed/status/config"]);
        let config: serde_json::Value = serde_json::from_str(&transport.published[0].payload).unwrap();
        assert_eq!(config["name"], "Status");
        assert_eq!(config["stat_t"], "shed/status");
        assert_eq!(config["payload_on"], "online");
        assert_eq!(config["payload_off"], "offline");
        assert_eq!(config["dev_cla"], "connectivity");
        assert_eq!(config["unique_id"], "shed_status");
    }

    #[test]
    fn test_availability_reports_online() {
        let mut transport = RecordingTransport::new();
        let mut status = Availability::new();
        status.initialize(&identity());
        status.report_online(&mut transport).unwrap();
        assert_eq!(transport.payloads_to("shed/status"), vec!["online"]);
        assert!(transport.published[0].retain);
    }
}
