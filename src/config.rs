use std::path::PathBuf;

use serde::Deserialize;

use device2mqtt::{BinarySensorClass, DeviceIdentity, SensorClass};

#[derive(Deserialize, Debug)]
pub struct Config {
    pub device: DeviceIdentity,
    pub mqtt: MqttConfig,
    pub discovery_prefix: Option<String>,
    #[serde(default = "default_true")]
    pub availability: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
    #[serde(default)]
    pub binary_sensors: Vec<BinarySensorConfig>,
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
}

#[derive(Deserialize, Debug)]
pub struct MqttConfig {
    pub address: String,
    pub client_id: Option<String>,
    pub auth: Option<MqttAuth>,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

#[derive(Deserialize, Debug)]
pub struct MqttAuth {
    pub user: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct SensorConfig {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub class: Option<SensorClass>,
    pub unit: Option<String>,
    pub path: PathBuf,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default)]
    pub hysteresis: f64,
    pub precision: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct BinarySensorConfig {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub class: Option<BinarySensorClass>,
    pub path: PathBuf,
    #[serde(default)]
    pub inverted: bool,
}

#[derive(Deserialize, Debug)]
pub struct SwitchConfig {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub path: PathBuf,
    #[serde(default)]
    pub initial: bool,
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_keep_alive_secs() -> u64 {
    60
}

fn default_scale() -> f64 {
    1.0
}

fn default_window_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use device2mqtt::SensorClass;
    use super::Config;

    const CONFIG: &str = "
device:
  name: pi
  friendly_name: Raspberry Pi
  sw_version: '1.0'
  model: Pi 4
  manufacturer: Raspberry Pi Ltd
  identifier: dc:a6:32:00:00:01
mqtt:
  address: broker.local:1883
  auth:
    user: pi
    password: secret
sensors:
  - id: cpu_temp
    name: CPU Temperature
    class: temperature
    path: /sys/class/thermal/thermal_zone0/temp
    scale: 0.001
    hysteresis: 0.5
switches:
  - id: led
    name: Activity LED
    path: /sys/class/leds/led0/brightness
";

    #[test]
    fn test_parse_config() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        assert_eq!(config.device.name, "pi");
        assert_eq!(config.mqtt.address, "broker.local:1883");
        assert_eq!(config.mqtt.keep_alive_secs, 60);
        assert!(config.mqtt.client_id.is_none());
        assert!(config.availability);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.sensors.len(), 1);
        let sensor = &config.sensors[0];
        assert_eq!(sensor.class, Some(SensorClass::Temperature));
        assert_eq!(sensor.scale, 0.001);
        assert_eq!(sensor.window_secs, 60);
        assert_eq!(sensor.path, PathBuf::from("/sys/class/thermal/thermal_zone0/temp"));
        assert!(config.binary_sensors.is_empty());
        assert!(!config.switches[0].initial);
    }
}
