use snafu::prelude::*;

use crate::entity::{EntityError, TransportSnafu};
use crate::registry::Registry;
use crate::transport::{Credentials, Transport};

impl Registry {
    /// Connects the transport, wiring the availability beacon when there is one.
    ///
    /// With an availability entity the broker gets a retained `offline` last
    /// will on its topic, and `online` is published there right after the
    /// connection is up. Without one the connection has no last will.
    /// No retries happen here.
    pub fn connect_with_availability(
        &self,
        transport: &mut dyn Transport,
        credentials: &Credentials,
    ) -> Result<(), EntityError> {
        let Some(availability) = self.availability() else {
            log::debug!("Connecting as '{}' without availability", credentials.client_id);
            return transport.connect(credentials, None)
                .context(TransportSnafu);
        };

        let will = availability.last_will()?;
        log::debug!("Connecting as '{}' with last will on {}", credentials.client_id, will.topic);
        transport.connect(credentials, Some(&will))
            .context(TransportSnafu)?;
        log::info!("Connected to broker as '{}'", credentials.client_id);

        if let Err(e) = availability.report_online(transport) {
            log::warn!("Cannot report availability: {e}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::availability::Availability;
    use crate::entity::EntityError;
    use crate::hass::DeviceIdentity;
    use crate::registry::Registry;
    use crate::sensor::BinarySensor;
    use crate::transport::testing::RecordingTransport;
    use crate::transport::{Credentials, LastWill};

    fn identity() -> DeviceIdentity {
        DeviceIdentity {
            name: "barn".to_string(),
            friendly_name: "Barn".to_string(),
            sw_version: "0.9".to_string(),
            model: "h2".to_string(),
            manufacturer: "Acme".to_string(),
            identifier: "fe:dc:ba:98:76:54".to_string(),
        }
    }

    #[test]
    fn test_connect_with_availability() {
        let mut transport = RecordingTransport::new();
        let mut registry = Registry::new(identity());
        registry.add_availability(Availability::new()).unwrap();
        registry.initialize_all();

        let credentials = Credentials::new("barn-node").with_auth("user", "secret");
        registry.connect_with_availability(&mut transport, &credentials).unwrap();

        assert_eq!(
            transport.connects,
            vec![(
                credentials,
                Some(LastWill {
                    topic: "barn/status".to_string(),
                    payload: "offline".to_string(),
                    qos: 0,
                    retain: true,
                })
            )]
        );
        assert_eq!(transport.payloads_to("barn/status"), vec!["online"]);
        assert!(transport.published[0].retain);
    }

    #[test]
    fn test_connect_without_availability() {
        let mut transport = RecordingTransport::new();
        let mut registry = Registry::new(identity());
        registry.add_binary_sensor(BinarySensor::new("door", "Door"));
        registry.initialize_all();

        registry.connect_with_availability(&mut transport, &Credentials::new("barn-node")).unwrap();
        assert_eq!(transport.connects.len(), 1);
        assert_eq!(transport.connects[0].1, None);
        assert!(transport.published.is_empty());
    }

    #[test]
    fn test_connect_failure_publishes_nothing() {
        let mut transport = RecordingTransport::new();
        transport.refuse_connect = true;
        let mut registry = Registry::new(identity());
        registry.add_availability(Availability::new()).unwrap();
        registry.initialize_all();

        let res = registry.connect_with_availability(&mut transport, &Credentials::new("barn-node"));
        assert!(matches!(res, Err(EntityError::Transport { .. })));
        assert!(transport.published.is_empty());
    }

    #[test]
    fn test_connect_requires_initialized_availability() {
        let mut transport = RecordingTransport::new();
        let mut registry = Registry::new(identity());
        registry.add_availability(Availability::new()).unwrap();

        let res = registry.connect_with_availability(&mut transport, &Credentials::new("barn-node"));
        assert!(matches!(res, Err(EntityError::NotInitialized { .. })));
        assert!(transport.connects.is_empty());
    }
}
