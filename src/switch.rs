use std::fmt;

use snafu::prelude::*;

use crate::entity::{Component, EntityError, EntityInfo, TransportSnafu};
use crate::hass::{DeviceIdentity, Discovery, STATE_OFF, STATE_ON};
use crate::topic::{self, EntityKind};
use crate::transport::Transport;

/// Decoded payload of a switch command topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    On,
    Off,
}

impl SwitchCommand {
    /// Matches `ON`/`OFF` in any case.
    pub fn parse(payload: &str) -> Option<Self> {
        if payload.eq_ignore_ascii_case(STATE_ON) {
            Some(SwitchCommand::On)
        } else if payload.eq_ignore_ascii_case(STATE_OFF) {
            Some(SwitchCommand::Off)
        } else {
            None
        }
    }

    pub fn state(&self) -> bool {
        matches!(self, SwitchCommand::On)
    }
}

/// Controllable on/off entity.
///
/// The state change handler runs synchronously inside [`Switch::set_state`],
/// before the new state is published. A panicking handler is not caught.
pub struct Switch {
    info: EntityInfo,
    command_topic: String,
    state: bool,
    on_change: Box<dyn FnMut(bool)>,
}

impl Switch {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        on_change: impl FnMut(bool) + 'static,
    ) -> Self {
        Self {
            info: EntityInfo::new(id, name),
            command_topic: String::new(),
            state: false,
            on_change: Box::new(on_change),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.info.set_icon(icon);
        self
    }

    /// Initial state, set without calling the handler.
    pub fn with_state(mut self, state: bool) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> bool {
        self.state
    }

    /// Empty until the entity is initialized.
    pub fn command_topic(&self) -> &str {
        &self.command_topic
    }

    /// Stores the state, runs the handler, then publishes the state.
    ///
    /// The state and the handler call stick even if publishing fails.
    pub fn set_state(&mut self, transport: &mut dyn Transport, state: bool) -> Result<(), EntityError> {
        self.state = state;
        (self.on_change)(state);
        self.report_state(transport)
    }

    /// Publishes the current state without touching the handler.
    pub fn report_state(&self, transport: &mut dyn Transport) -> Result<(), EntityError> {
        self.info.publish_state(transport, if self.state { STATE_ON } else { STATE_OFF }, true)
    }
}

impl fmt::Debug for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switch")
            .field("info", &self.info)
            .field("command_topic", &self.command_topic)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Component for Switch {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut EntityInfo {
        &mut self.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Switch
    }

    fn initialize(&mut self, device: &DeviceIdentity) {
        let state_topic = topic::state_topic(&device.name, EntityKind::Switch, self.info.id());
        self.info.set_state_topic(state_topic);
        self.command_topic = topic::command_topic(&device.name, EntityKind::Switch, self.info.id());
    }

    fn config_payload(&self, discovery: &mut Discovery) {
        discovery.command_topic = Some(self.command_topic.clone());
    }

    fn on_publish(&mut self, transport: &mut dyn Transport) -> Result<(), EntityError> {
        log::debug!("Subscribing to {}", self.command_topic);
        transport.subscribe(&self.command_topic)
            .context(TransportSnafu)?;
        self.report_state(transport)
    }
}
