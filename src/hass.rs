//! Home Assistant discovery documents and device/entity classes.

use serde::{Deserialize, Serialize};

pub const STATE_ON: &str = "ON";
pub const STATE_OFF: &str = "OFF";
pub const PAYLOAD_ONLINE: &str = "online";
pub const PAYLOAD_OFFLINE: &str = "offline";

/// Identity shared by every entity of the device.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DeviceIdentity {
    /// Topic root and unique id prefix. Must not contain `/`.
    pub name: String,
    pub friendly_name: String,
    pub sw_version: String,
    pub model: String,
    pub manufacturer: String,
    /// MAC or any other address that is unique to this device.
    pub identifier: String,
}

/// Discovery config payload, serialized with abbreviated keys.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Discovery {
    pub name: String,
    #[serde(rename = "stat_t")]
    pub state_topic: String,
    #[serde(rename = "cmd_t", skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    #[serde(rename = "frc_upd", skip_serializing_if = "Option::is_none")]
    pub force_update: Option<bool>,
    #[serde(rename = "unit_of_meas", skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    #[serde(rename = "dev_cla", skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<String>,
    pub unique_id: String,
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub device: Device,
}

impl Discovery {
    /// Document with only the fields every entity kind carries.
    pub fn new(name: &str, state_topic: &str, object_id: String, device: Device) -> Self {
        Self {
            name: name.to_string(),
            state_topic: state_topic.to_string(),
            command_topic: None,
            force_update: None,
            unit_of_measurement: None,
            device_class: None,
            payload_on: None,
            payload_off: None,
            unique_id: object_id.clone(),
            object_id,
            icon: None,
            device,
        }
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Device {
    pub identifiers: Vec<String>,
    pub name: String,
    pub sw_version: String,
    pub model: String,
    pub manufacturer: String,
}

impl From<&DeviceIdentity> for Device {
    fn from(identity: &DeviceIdentity) -> Self {
        Self {
            identifiers: vec![identity.identifier.clone()],
            name: identity.friendly_name.clone(),
            sw_version: identity.sw_version.clone(),
            model: identity.model.clone(),
            manufacturer: identity.manufacturer.clone(),
        }
    }
}

// https://www.home-assistant.io/integrations/sensor/#device-class
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SensorClass {
    Battery,
    Humidity,
    Illuminance,
    Temperature,
    Pressure,
    Power,
    Energy,
    Voltage,
    // No Home Assistant device class, unit only
    Dust,
    Ppm,
    Ppb,
}

impl SensorClass {
    pub fn device_class(&self) -> Option<&'static str> {
        match self {
            SensorClass::Battery => Some("battery"),
            SensorClass::Humidity => Some("humidity"),
            SensorClass::Illuminance => Some("illuminance"),
            SensorClass::Temperature => Some("temperature"),
            SensorClass::Pressure => Some("pressure"),
            SensorClass::Power => Some("power"),
            SensorClass::Energy => Some("energy"),
            SensorClass::Voltage => Some("voltage"),
            SensorClass::Dust | SensorClass::Ppm | SensorClass::Ppb => None,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorClass::Temperature => "°C",
            SensorClass::Humidity | SensorClass::Battery => "%",
            SensorClass::Illuminance => "lx",
            SensorClass::Pressure => "mbar",
            SensorClass::Power => "W",
            SensorClass::Energy => "Wh",
            SensorClass::Voltage => "V",
            SensorClass::Dust => "ug/m³",
            SensorClass::Ppm => "ppm",
            SensorClass::Ppb => "ppb",
        }
    }
}

// https://www.home-assistant.io/integrations/binary_sensor/#device-class
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BinarySensorClass {
    Battery,
    Cold,
    Connectivity,
    Door,
    GarageDoor,
    Gas,
    Heat,
    Light,
    Lock,
    Moisture,
    Motion,
    Moving,
    Occupancy,
    Opening,
    Plug,
    Power,
    Presence,
    Problem,
    Safety,
    Smoke,
    Sound,
    Vibration,
    Window,
}

impl BinarySensorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinarySensorClass::Battery => "battery",
            BinarySensorClass::Cold => "cold",
            BinarySensorClass::Connectivity => "connectivity",
            BinarySensorClass::Door => "door",
            BinarySensorClass::GarageDoor => "garage_door",
            BinarySensorClass::Gas => "gas",
            BinarySensorClass::Heat => "heat",
            BinarySensorClass::Light => "light",
            BinarySensorClass::Lock => "lock",
            BinarySensorClass::Moisture => "moisture",
            BinarySensorClass::Motion => "motion",
            BinarySensorClass::Moving => "moving",
            BinarySensorClass::Occupancy => "occupancy",
            BinarySensorClass::Opening => "opening",
            BinarySensorClass::Plug => "plug",
            BinarySensorClass::Power => "power",
            BinarySensorClass::Presence => "presence",
            BinarySensorClass::Problem => "problem",
            BinarySensorClass::Safety => "safety",
            BinarySensorClass::Smoke => "smoke",
            BinarySensorClass::Sound => "sound",
            BinarySensorClass::Vibration => "vibration",
            BinarySensorClass::Window => "window",
        }
    }
}
