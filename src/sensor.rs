use std::time::{Duration, Instant};

use crate::entity::{Component, EntityError, EntityInfo};
use crate::filter::SamplingFilter;
use crate::hass::{BinarySensorClass, Discovery, SensorClass, STATE_OFF, STATE_ON};
use crate::topic::EntityKind;
use crate::transport::Transport;

const DEFAULT_PRECISION: usize = 2;

/// Numeric reading, averaged over a window and published when it moves.
#[derive(Debug, Clone)]
pub struct NumericSensor {
    info: EntityInfo,
    class: Option<SensorClass>,
    unit: Option<String>,
    precision: usize,
    filter: SamplingFilter,
}

impl NumericSensor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, window: Duration) -> Self {
        Self {
            info: EntityInfo::new(id, name),
            class: None,
            unit: None,
            precision: DEFAULT_PRECISION,
            filter: SamplingFilter::new(window, 0.0),
        }
    }

    pub fn with_class(mut self, class: SensorClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_hysteresis(mut self, hysteresis: f64) -> Self {
        self.filter.set_hysteresis(hysteresis);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.info.set_icon(icon);
        self
    }

    /// Overrides the unit implied by the sensor class.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Decimal places in the published state.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Replaces the filter, mostly to control the window start.
    pub fn with_filter(mut self, filter: SamplingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn class(&self) -> Option<SensorClass> {
        self.class
    }

    pub fn unit(&self) -> &str {
        match (&self.unit, self.class) {
            (Some(unit), _) => unit.as_str(),
            (None, Some(class)) => class.unit(),
            (None, None) => "",
        }
    }

    pub fn filter(&self) -> &SamplingFilter {
        &self.filter
    }

    /// Last published value. Does not sample.
    pub fn current(&self) -> Option<f64> {
        self.filter.last_emitted()
    }

    pub fn format_value(&self, value: f64) -> String {
        format!("{value:.*}", self.precision)
    }

    /// Feeds a reading. Returns the value that was published, if any.
    pub fn update(
        &mut self,
        transport: &mut dyn Transport,
        value: f64,
    ) -> Result<Option<f64>, EntityError> {
        self.update_at(transport, value, Instant::now())
    }

    pub fn update_at(
        &mut self,
        transport: &mut dyn Transport,
        value: f64,
        now: Instant,
    ) -> Result<Option<f64>, EntityError> {
        let Some(mean) = self.filter.update_at(value, now) else {
            return Ok(None);
        };
        let payload = self.format_value(mean);
        self.info.publish_state(transport, &payload, true)?;
        Ok(Some(mean))
    }
}

impl Component for NumericSensor {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut EntityInfo {
        &mut self.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Sensor
    }

    fn config_payload(&self, discovery: &mut Discovery) {
        // Regularly spaced samples even when the value is flat
        discovery.force_update = Some(true);
        discovery.unit_of_measurement = Some(self.unit().to_string());
        discovery.device_class = self.class
            .and_then(|c| c.device_class())
            .map(str::to_string);
    }
}

#[derive(Debug, Clone)]
pub struct BinarySensor {
    info: EntityInfo,
    class: Option<BinarySensorClass>,
    state: Option<bool>,
}

impl BinarySensor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            info: EntityInfo::new(id, name),
            class: None,
            state: None,
        }
    }

    pub fn with_class(mut self, class: BinarySensorClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.info.set_icon(icon);
        self
    }

    /// Last reported state.
    pub fn state(&self) -> Option<bool> {
        self.state
    }

    pub fn report_state(
        &mut self,
        transport: &mut dyn Transport,
        state: bool,
    ) -> Result<(), EntityError> {
        self.info.publish_state(transport, if state { STATE_ON } else { STATE_OFF }, true)?;
        self.state = Some(state);
        Ok(())
    }
}

impl Component for BinarySensor {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut EntityInfo {
        &mut self.info
    }

    fn kind(&self) -> EntityKind {
        EntityKind::BinarySensor
    }

    fn config_payload(&self, discovery: &mut Discovery) {
        discovery.device_class = self.class.map(|c| c.as_str().to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::entity::Component;
    use crate::filter::SamplingFilter;
    use crate::hass::{BinarySensorClass, DeviceIdentity, SensorClass};
    use crate::transport::testing::RecordingTransport;
    use super::{BinarySensor, NumericSensor};

    const WINDOW: Duration = Duration::from_secs(30);

    fn identity() -> DeviceIdentity {
        DeviceIdentity {
            name: "attic".to_string(),
            friendly_name: "Attic".to_string(),
            sw_version: "2.0".to_string(),
            model: "c3".to_string(),
            manufacturer: "Acme".to_string(),
            identifier: "de:ad:be:ef:00:01".to_string(),
        }
    }

    #[test]
    fn test_numeric_sensor_discovery() {
        let mut sensor = NumericSensor::new("temp", "Temperature", WINDOW)
            .with_class(SensorClass::Temperature)
            .with_icon("mdi:thermometer");
        sensor.initialize(&identity());
        let value = serde_json::to_value(sensor.discovery(&identity())).unwrap();
        assert_eq!(value["name"], "Temperature");
        assert_eq!(value["stat_t"], "attic/sensor/temp/state");
        assert_eq!(value["frc_upd"], true);
        assert_eq!(value["unit_of_meas"], "°C");
        assert_eq!(value["dev_cla"], "temperature");
        assert_eq!(value["unique_id"], "attic_temp");
        assert_eq!(value["object_id"], "attic_temp");
        assert_eq!(value["icon"], "mdi:thermometer");
        assert_eq!(value["device"]["identifiers"][0], "de:ad:be:ef:00:01");
        assert!(value.get("cmd_t").is_none());
    }

    #[test]
    fn test_numeric_sensor_without_class() {
        let sensor = NumericSensor::new("count", "Count", WINDOW);
        let value = serde_json::to_value(sensor.discovery(&identity())).unwrap();
        assert_eq!(value["unit_of_meas"], "");
        assert!(value.get("dev_cla").is_none());
        assert!(value.get("icon").is_none());

        let sensor = NumericSensor::new("co2", "CO2", WINDOW)
            .with_class(SensorClass::Ppm)
            .with_unit("ppm CO2");
        let value = serde_json::to_value(sensor.discovery(&identity())).unwrap();
        assert_eq!(value["unit_of_meas"], "ppm CO2");
        assert!(value.get("dev_cla").is_none());
    }

    #[test]
    fn test_numeric_sensor_publishes_window_mean() {
        let start = Instant::now();
        let mut transport = RecordingTransport::new();
        let mut sensor = NumericSensor::new("temp", "Temperature", WINDOW)
            .with_filter(SamplingFilter::started_at(WINDOW, 0.5, start));
        sensor.initialize(&identity());

        assert_eq!(sensor.update_at(&mut transport, 21.0, start).unwrap(), None);
        assert_eq!(sensor.update_at(&mut transport, 22.0, start + WINDOW).unwrap(), Some(21.5));
        assert_eq!(sensor.update_at(&mut transport, 21.75, start + WINDOW * 2).unwrap(), None);
        assert_eq!(sensor.current(), Some(21.5));
        assert_eq!(transport.payloads_to("attic/sensor/temp/state"), vec!["21.50"]);
        assert!(transport.published[0].retain);
    }

    #[test]
    fn test_numeric_sensor_precision() {
        let sensor = NumericSensor::new("p", "Pressure", WINDOW).with_precision(0);
        assert_eq!(sensor.format_value(1013.4), "1013");
        let sensor = NumericSensor::new("p", "Pressure", WINDOW);
        assert_eq!(sensor.format_value(10.0), "10.00");
    }

    #[test]
    fn test_binary_sensor_reports_state() {
        let mut transport = RecordingTransport::new();
        let mut door = BinarySensor::new("door", "Door").with_class(BinarySensorClass::Door);
        door.initialize(&identity());
        door.report_state(&mut transport, true).unwrap();
        door.report_state(&mut transport, false).unwrap();
        assert_eq!(door.state(), Some(false));
        assert_eq!(
            transport.payloads_to("attic/binary_sensor/door/state"),
            vec!["ON", "OFF"]
        );

        let value = serde_json::to_value(door.discovery(&identity())).unwrap();
        assert_eq!(value["dev_cla"], "door");
        assert!(value.get("frc_upd").is_none());
    }
}
