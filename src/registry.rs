//! Ordered collection of every entity of the device.
//!
//! Entities are appended during startup and never removed. The registry is
//! meant to live on a single thread: add entities first, then initialize,
//! connect, publish and dispatch from the same context. Switch handlers are
//! not `Send`, so the compiler keeps the registry on that thread.

use crate::availability::Availability;
use crate::entity::{Component, Entity, EntityError};
use crate::hass::DeviceIdentity;
use crate::sensor::{BinarySensor, NumericSensor};
use crate::switch::{Switch, SwitchCommand};
use crate::topic::{self, DISCOVERY_PREFIX};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinarySensorHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchHandle(usize);

/// What happened to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A switch took the command. `state` is the new state.
    Applied { id: String, state: bool },
    /// The topic belongs to a switch but the payload is not `ON`/`OFF`.
    Invalid { id: String, payload: String },
    /// No switch listens on the topic.
    Unmatched,
}

#[derive(Debug)]
pub struct Registry {
    device: DeviceIdentity,
    discovery_prefix: String,
    entities: Vec<Entity>,
    // Indexes into `entities`
    switches: Vec<usize>,
    availability: Option<usize>,
}

impl Registry {
    pub fn new(device: DeviceIdentity) -> Self {
        Self {
            device,
            discovery_prefix: DISCOVERY_PREFIX.to_string(),
            entities: Vec::new(),
            switches: Vec::new(),
            availability: None,
        }
    }

    pub fn with_discovery_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.discovery_prefix = prefix.into();
        self
    }

    pub fn device(&self) -> &DeviceIdentity {
        &self.device
    }

    pub fn discovery_prefix(&self) -> &str {
        &self.discovery_prefix
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn add_sensor(&mut self, sensor: NumericSensor) -> SensorHandle {
        SensorHandle(self.push(Entity::Sensor(sensor)))
    }

    pub fn add_binary_sensor(&mut self, sensor: BinarySensor) -> BinarySensorHandle {
        BinarySensorHandle(self.push(Entity::BinarySensor(sensor)))
    }

    pub fn add_switch(&mut self, switch: Switch) -> SwitchHandle {
        let idx = self.push(Entity::Switch(switch));
        self.switches.push(idx);
        SwitchHandle(idx)
    }

    /// Registers the device availability beacon. Only one is allowed.
    pub fn add_availability(&mut self, availability: Availability) -> Result<(), EntityError> {
        if let Some(current) = self.availability() {
            log::warn!("Ignoring second availability entity '{}'", availability.info().id());
            return Err(EntityError::AvailabilityAlreadyRegistered {
                id: current.info().id().to_string(),
            });
        }
        let idx = self.push(Entity::Availability(availability));
        self.availability = Some(idx);
        Ok(())
    }

    fn push(&mut self, entity: Entity) -> usize {
        log::debug!("Registering entity '{}'", entity.info().id());
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn sensor(&self, handle: SensorHandle) -> Option<&NumericSensor> {
        match self.entities.get(handle.0) {
            Some(Entity::Sensor(s)) => Some(s),
            _ => None,
        }
    }

    pub fn sensor_mut(&mut self, handle: SensorHandle) -> Option<&mut NumericSensor> {
        match self.entities.get_mut(handle.0) {
            Some(Entity::Sensor(s)) => Some(s),
            _ => None,
        }
    }

    pub fn binary_sensor(&self, handle: BinarySensorHandle) -> Option<&BinarySensor> {
        match self.entities.get(handle.0) {
            Some(Entity::BinarySensor(s)) => Some(s),
            _ => None,
        }
    }

    pub fn binary_sensor_mut(&mut self, handle: BinarySensorHandle) -> Option<&mut BinarySensor> {
        match self.entities.get_mut(handle.0) {
            Some(Entity::BinarySensor(s)) => Some(s),
            _ => None,
        }
    }

    pub fn switch(&self, handle: SwitchHandle) -> Option<&Switch> {
        match self.entities.get(handle.0) {
            Some(Entity::Switch(s)) => Some(s),
            _ => None,
        }
    }

    pub fn switch_mut(&mut self, handle: SwitchHandle) -> Option<&mut Switch> {
        match self.entities.get_mut(handle.0) {
            Some(Entity::Switch(s)) => Some(s),
            _ => None,
        }
    }

    pub fn availability(&self) -> Option<&Availability> {
        match self.availability.and_then(|idx| self.entities.get(idx)) {
            Some(Entity::Availability(a)) => Some(a),
            _ => None,
        }
    }

    /// Computes the topics of every entity, in registration order.
    ///
    /// Does not need a connection. Calling it again recomputes the same topics.
    pub fn initialize_all(&mut self) {
        for entity in self.entities.iter_mut() {
            let component = entity.component_mut();
            component.initialize(&self.device);
            topic::check_length(component.info().state_topic());
            if let Entity::Switch(switch) = entity {
                topic::check_length(switch.command_topic());
            }
        }
    }

    /// Announces (`present`) or withdraws every entity.
    ///
    /// Failures are logged and do not stop the broadcast. Returns how many
    /// entities failed.
    pub fn publish_config_all(&mut self, transport: &mut dyn Transport, present: bool) -> usize {
        let mut failed = 0;
        for entity in self.entities.iter_mut() {
            let component = entity.component_mut();
            let res = component.publish_config(&self.device, &self.discovery_prefix, transport, present);
            if let Err(e) = res {
                failed += 1;
                log::warn!(
                    "Error when {} entity '{}': {e}",
                    if present { "publishing" } else { "unpublishing" },
                    component.info().id()
                );
            }
        }
        failed
    }

    /// Routes an inbound message to the switch whose command topic matches.
    ///
    /// The first matching switch wins. Unknown topics are dropped silently.
    pub fn dispatch(&mut self, transport: &mut dyn Transport, topic: &str, payload: &[u8]) -> Dispatch {
        let matched = self.switches.iter()
            .copied()
            .find(|&idx| match &self.entities[idx] {
                Entity::Switch(s) => s.command_topic() == topic,
                _ => false,
            });
        let Some(Entity::Switch(switch)) = matched.map(|idx| &mut self.entities[idx]) else {
            return Dispatch::Unmatched;
        };

        let payload = String::from_utf8_lossy(payload);
        let id = switch.info().id().to_string();
        let Some(command) = SwitchCommand::parse(&payload) else {
            log::warn!("Invalid payload received for switch '{id}': {payload}");
            return Dispatch::Invalid { id, payload: payload.into_owned() };
        };

        let state = command.state();
        if let Err(e) = switch.set_state(transport, state) {
            log::warn!("Cannot publish state of switch '{id}': {e}");
        }
        Dispatch::Applied { id, state }
    }
}
