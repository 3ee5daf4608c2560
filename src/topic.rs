//! Topic naming for entities.
//!
//! Segments are plain ASCII tokens without `/`. Nothing here escapes or
//! validates them.

use std::fmt;

/// Root of every discovery topic unless the registry is told otherwise.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// Practical ceiling for a topic on small brokers/clients. Longer topics
/// still work here, they are only reported.
pub const TOPIC_LENGTH_HINT: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Sensor,
    BinarySensor,
    Switch,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Sensor => "sensor",
            EntityKind::BinarySensor => "binary_sensor",
            EntityKind::Switch => "switch",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{device}/{kind}/{id}/state`
pub fn state_topic(device: &str, kind: EntityKind, id: &str) -> String {
    format!("{device}/{kind}/{id}/state")
}

/// `{device}/{kind}/{id}/ctrl`
pub fn command_topic(device: &str, kind: EntityKind, id: &str) -> String {
    format!("{device}/{kind}/{id}/ctrl")
}

/// `{prefix}/{kind}/{device}/{id}/config`
pub fn discovery_topic(prefix: &str, kind: EntityKind, device: &str, id: &str) -> String {
    format!("{}/config", discovery_node(prefix, kind, device, id))
}

/// Parent node of the discovery topic, cleared together with it on withdraw.
pub fn discovery_node(prefix: &str, kind: EntityKind, device: &str, id: &str) -> String {
    format!("{prefix}/{kind}/{device}/{id}")
}

/// `{device}/{id}`, used by the availability beacon instead of a kind-scoped topic.
pub fn device_topic(device: &str, id: &str) -> String {
    format!("{device}/{id}")
}

/// Unique id and object id in discovery documents.
pub fn object_id(device: &str, id: &str) -> String {
    format!("{device}_{id}")
}

/// Logs topics above [`TOPIC_LENGTH_HINT`]. Returns whether the topic fits.
pub(crate) fn check_length(topic: &str) -> bool {
    if topic.len() > TOPIC_LENGTH_HINT {
        log::warn!(
            "Topic is {} bytes, above the {TOPIC_LENGTH_HINT} byte ceiling: {topic}",
            topic.len()
        );
        return false;
    }
    true
}
