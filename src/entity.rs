use snafu::prelude::*;
use snafu::Snafu;

use crate::availability::Availability;
use crate::hass::{Device, DeviceIdentity, Discovery};
use crate::sensor::{BinarySensor, NumericSensor};
use crate::switch::Switch;
use crate::topic::{self, EntityKind};
use crate::transport::{Transport, TransportError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EntityError {
    #[snafu(display("Transport error: {source}"))]
    Transport { source: TransportError },

    #[snafu(display("Entity '{id}' has no topics yet, initialize it first"))]
    NotInitialized { id: String },

    #[snafu(display("Error when serializing discovery message: {source}"))]
    Serialize { source: serde_json::Error },

    #[snafu(display("Availability entity '{id}' is already registered"))]
    AvailabilityAlreadyRegistered { id: String },
}

/// Identity and state topic every entity kind carries.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    id: String,
    name: String,
    icon: Option<String>,
    state_topic: String,
}

impl EntityInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
            state_topic: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn set_icon(&mut self, icon: impl Into<String>) {
        self.icon = Some(icon.into());
    }

    /// Empty until the entity is initialized.
    pub fn state_topic(&self) -> &str {
        &self.state_topic
    }

    pub fn is_initialized(&self) -> bool {
        !self.state_topic.is_empty()
    }

    pub(crate) fn set_state_topic(&mut self, state_topic: String) {
        self.state_topic = state_topic;
    }

    pub(crate) fn publish_state(
        &self,
        transport: &mut dyn Transport,
        payload: &str,
        retain: bool,
    ) -> Result<(), EntityError> {
        ensure!(self.is_initialized(), NotInitializedSnafu { id: &self.id });
        log::trace!("Sending message to {}: {payload}", self.state_topic);
        transport.publish(&self.state_topic, payload.as_bytes(), retain)
            .context(TransportSnafu)
    }

    /// Removes the retained state so stale values are not shown.
    pub(crate) fn clear_state(&self, transport: &mut dyn Transport) -> Result<(), EntityError> {
        ensure!(self.is_initialized(), NotInitializedSnafu { id: &self.id });
        log::trace!("Clearing {}", self.state_topic);
        transport.publish_empty(&self.state_topic, true)
            .context(TransportSnafu)
    }
}

/// Behaviour that differs between entity kinds.
///
/// The provided methods implement the announce/withdraw lifecycle on top of
/// the per-kind hooks.
pub trait Component {
    fn info(&self) -> &EntityInfo;

    fn info_mut(&mut self) -> &mut EntityInfo;

    fn kind(&self) -> EntityKind;

    /// Computes topics. Safe to call again.
    fn initialize(&mut self, device: &DeviceIdentity) {
        let kind = self.kind();
        let info = self.info_mut();
        let state_topic = topic::state_topic(&device.name, kind, &info.id);
        info.set_state_topic(state_topic);
    }

    /// Adds kind specific fields to the discovery document.
    fn config_payload(&self, _discovery: &mut Discovery) {}

    /// Runs after the discovery config is accepted.
    fn on_publish(&mut self, _transport: &mut dyn Transport) -> Result<(), EntityError> {
        Ok(())
    }

    /// Runs after the discovery config and state are cleared.
    fn on_withdraw(&mut self, _transport: &mut dyn Transport) -> Result<(), EntityError> {
        Ok(())
    }

    fn discovery(&self, device: &DeviceIdentity) -> Discovery {
        let info = self.info();
        let mut discovery = Discovery::new(
            &info.name,
            &info.state_topic,
            topic::object_id(&device.name, &info.id),
            Device::from(device),
        );
        discovery.icon = info.icon.clone();
        self.config_payload(&mut discovery);
        discovery
    }

    /// Announces (`present`) or withdraws the entity.
    fn publish_config(
        &mut self,
        device: &DeviceIdentity,
        prefix: &str,
        transport: &mut dyn Transport,
        present: bool,
    ) -> Result<(), EntityError> {
        let info = self.info();
        ensure!(info.is_initialized(), NotInitializedSnafu { id: &info.id });
        let config_topic = topic::discovery_topic(prefix, self.kind(), &device.name, &info.id);

        if present {
            let payload = serde_json::to_string(&self.discovery(device))
                .context(SerializeSnafu)?;
            log::info!("publish: {config_topic}");
            log::trace!("Sending message to {config_topic}: {payload}");
            transport.publish(&config_topic, payload.as_bytes(), true)
                .context(TransportSnafu)?;
            self.on_publish(transport)
        } else {
            let node_topic = topic::discovery_node(prefix, self.kind(), &device.name, &info.id);
            log::info!("unpublish: {config_topic}");
            let cleared = [
                transport.publish_empty(&config_topic, true).context(TransportSnafu),
                transport.publish_empty(&node_topic, true).context(TransportSnafu),
                info.clear_state(transport),
            ];
            for res in cleared {
                res?;
            }
            self.on_withdraw(transport)
        }
    }
}

/// Every entity kind the registry can hold.
#[derive(Debug)]
pub enum Entity {
    Sensor(NumericSensor),
    BinarySensor(BinarySensor),
    Switch(Switch),
    Availability(Availability),
}

impl Entity {
    pub fn component(&self) -> &dyn Component {
        match self {
            Entity::Sensor(c) => c,
            Entity::BinarySensor(c) => c,
            Entity::Switch(c) => c,
            Entity::Availability(c) => c,
        }
    }

    pub fn component_mut(&mut self) -> &mut dyn Component {
        match self {
            Entity::Sensor(c) => c,
            Entity::BinarySensor(c) => c,
            Entity::Switch(c) => c,
            Entity::Availability(c) => c,
        }
    }

    pub fn info(&self) -> &EntityInfo {
        self.component().info()
    }
}
