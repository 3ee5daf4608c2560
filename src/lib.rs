//! Publish device entities to Home Assistant over MQTT discovery.
//!
//! A device registers numeric sensors, binary sensors, switches and an
//! optional availability beacon in a [`Registry`]. Each entity announces a
//! retained discovery config under `homeassistant/<kind>/<device>/<id>/config`,
//! publishes state on `<device>/<kind>/<id>/state` and, for switches, takes
//! commands on `<device>/<kind>/<id>/ctrl`.
//!
//! The publish/subscribe client is abstracted by [`Transport`].
//!
//! ```ignore
//! let mut registry = Registry::new(identity);
//! registry.add_availability(Availability::new())?;
//! let temp = registry.add_sensor(
//!     NumericSensor::new("temp", "Temperature", Duration::from_secs(60))
//!         .with_class(SensorClass::Temperature)
//!         .with_hysteresis(0.2),
//! );
//! let relay = registry.add_switch(Switch::new("relay", "Relay", |on| set_relay(on)));
//!
//! registry.initialize_all();
//! registry.connect_with_availability(&mut transport, &Credentials::new("node-1"))?;
//! registry.publish_config_all(&mut transport, true);
//!
//! // inbound messages
//! registry.dispatch(&mut transport, topic, payload);
//! // readings
//! registry.sensor_mut(temp).unwrap().update(&mut transport, 21.4)?;
//! ```

pub mod availability;
mod connection;
pub mod entity;
pub mod filter;
pub mod hass;
pub mod registry;
pub mod sensor;
pub mod switch;
pub mod topic;
pub mod transport;

pub use availability::Availability;
pub use entity::{Component, Entity, EntityError, EntityInfo};
pub use filter::SamplingFilter;
pub use hass::{BinarySensorClass, DeviceIdentity, Discovery, SensorClass};
pub use registry::{BinarySensorHandle, Dispatch, Registry, SensorHandle, SwitchHandle};
pub use sensor::{BinarySensor, NumericSensor};
pub use switch::{Switch, SwitchCommand};
pub use topic::EntityKind;
pub use transport::{Credentials, LastWill, Transport, TransportError};
