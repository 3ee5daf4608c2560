use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use clap::Parser;

use snafu::{whatever, ResultExt, Whatever};

use device2mqtt::{
    Availability,
    BinarySensor,
    BinarySensorHandle,
    Credentials,
    NumericSensor,
    Registry,
    SensorHandle,
    Switch,
};

mod config;
use crate::config::Config;
mod mqtt;
use crate::mqtt::PahoTransport;
mod source;

const MQTT_RETRY_DELAY_SECS: u64 = 10;

#[derive(Parser, Debug)]
struct Args {
    config: PathBuf,
}

struct NumericSource {
    handle: SensorHandle,
    path: PathBuf,
    scale: f64,
}

struct FlagSource {
    handle: BinarySensorHandle,
    path: PathBuf,
    inverted: bool,
}

struct Sources {
    sensors: Vec<NumericSource>,
    binary_sensors: Vec<FlagSource>,
}

fn main() -> Result<(), Whatever> {
    env_logger::init();

    let args = Args::parse();

    let config_file = File::open(args.config)
        .with_whatever_context(|e| format!("Cannot open config file: {e}"))?;
    let config_reader = BufReader::new(config_file);
    let config: Config = serde_yaml::from_reader(config_reader)
        .with_whatever_context(|e| format!("Error when parsing config file: {e}"))?;
    if config.device.name.contains('/') {
        whatever!("Device name '{}' must not contain '/'", config.device.name);
    }

    let (mut registry, sources) = create_entities(&config)?;
    registry.initialize_all();

    let mut credentials = Credentials::new(
        config.mqtt.client_id.clone().unwrap_or_else(|| config.device.name.clone())
    );
    if let Some(auth) = &config.mqtt.auth {
        credentials = credentials.with_auth(&auth.user, &auth.password);
    }
    let mut transport = PahoTransport::new(
        &config.mqtt.address,
        Duration::from_secs(config.mqtt.keep_alive_secs),
    );
    let poll_interval = Duration::from_millis(config.poll_interval_ms);

    loop {
        establish_mqtt_conn(&registry, &mut transport, &credentials);
        let failed = registry.publish_config_all(&mut transport, true);
        if failed > 0 {
            log::warn!("{failed} of {} entities were not announced", registry.len());
        }
        run(&mut registry, &mut transport, &sources, poll_interval);
        log::warn!("Lost connection to mqtt server");
    }
}

fn create_entities(config: &Config) -> Result<(Registry, Sources), Whatever> {
    let mut registry = Registry::new(config.device.clone());
    if let Some(prefix) = &config.discovery_prefix {
        registry = registry.with_discovery_prefix(prefix);
    }
    if config.availability {
        registry.add_availability(Availability::new())
            .with_whatever_context(|e| format!("Cannot register availability: {e}"))?;
    }

    let mut sources = Sources {
        sensors: Vec::new(),
        binary_sensors: Vec::new(),
    };

    for sensor in config.sensors.iter() {
        let mut entity = NumericSensor::new(
            &sensor.id,
            &sensor.name,
            Duration::from_secs(sensor.window_secs),
        )
            .with_hysteresis(sensor.hysteresis);
        if let Some(class) = sensor.class {
            entity = entity.with_class(class);
        }
        if let Some(unit) = &sensor.unit {
            entity = entity.with_unit(unit);
        }
        if let Some(icon) = &sensor.icon {
            entity = entity.with_icon(icon);
        }
        if let Some(precision) = sensor.precision {
            entity = entity.with_precision(precision);
        }
        sources.sensors.push(NumericSource {
            handle: registry.add_sensor(entity),
            path: sensor.path.clone(),
            scale: sensor.scale,
        });
    }

    for sensor in config.binary_sensors.iter() {
        let mut entity = BinarySensor::new(&sensor.id, &sensor.name);
        if let Some(class) = sensor.class {
            entity = entity.with_class(class);
        }
        if let Some(icon) = &sensor.icon {
            entity = entity.with_icon(icon);
        }
        sources.binary_sensors.push(FlagSource {
            handle: registry.add_binary_sensor(entity),
            path: sensor.path.clone(),
            inverted: sensor.inverted,
        });
    }

    for switch in config.switches.iter() {
        if let Err(e) = source::write_flag(&switch.path, switch.initial) {
            log::warn!("Cannot set initial state of switch '{}': {e}", switch.id);
        }
        let path = switch.path.clone();
        let id = switch.id.clone();
        let mut entity = Switch::new(&switch.id, &switch.name, move |state| {
            log::info!("Switch '{id}' turned {}", if state { "on" } else { "off" });
            if let Err(e) = source::write_flag(&path, state) {
                log::warn!("Cannot apply state of switch '{id}': {e}");
            }
        })
            .with_state(switch.initial);
        if let Some(icon) = &switch.icon {
            entity = entity.with_icon(icon);
        }
        registry.add_switch(entity);
    }

    log::info!("Registered {} entities for '{}'", registry.len(), config.device.name);
    Ok((registry, sources))
}

fn establish_mqtt_conn(
    registry: &Registry,
    transport: &mut PahoTransport,
    credentials: &Credentials,
) {
    loop {
        if let Err(e) = registry.connect_with_availability(transport, credentials) {
            log::warn!("Unable to connect to mqtt server. Waiting:\n\t{e}");
            sleep(Duration::from_secs(MQTT_RETRY_DELAY_SECS));
        } else {
            return;
        }
    }
}

/// Serves commands and samples sources until the connection drops.
fn run(
    registry: &mut Registry,
    transport: &mut PahoTransport,
    sources: &Sources,
    poll_interval: Duration,
) {
    while transport.is_connected() {
        if let Some(msg) = transport.recv_timeout(poll_interval) {
            log::trace!("Received message on {}", msg.topic());
            registry.dispatch(transport, msg.topic(), msg.payload());
        }

        for src in sources.sensors.iter() {
            let value = match source::read_value(&src.path, src.scale) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("{e}");
                    continue;
                }
            };
            if let Some(sensor) = registry.sensor_mut(src.handle) {
                if let Err(e) = sensor.update(transport, value) {
                    log::warn!("Cannot publish sensor state: {e}");
                }
            }
        }

        for src in sources.binary_sensors.iter() {
            let state = match source::read_flag(&src.path, src.inverted) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("{e}");
                    continue;
                }
            };
            if let Some(sensor) = registry.binary_sensor_mut(src.handle) {
                if sensor.state() == Some(state) {
                    continue;
                }
                if let Err(e) = sensor.report_state(transport, state) {
                    log::warn!("Cannot publish binary sensor state: {e}");
                }
            }
        }
    }
}
