use std::thread::sleep;
use std::time::Duration;

use paho_mqtt as mqtt;

use device2mqtt::{Credentials, LastWill, Transport, TransportError};

type Inbox = Box<dyn Fn(Duration) -> Option<mqtt::Message>>;

/// [`Transport`] over the paho synchronous client.
pub struct PahoTransport {
    server_uri: String,
    keep_alive: Duration,
    client: Option<mqtt::Client>,
    inbox: Option<Inbox>,
}

impl PahoTransport {
    pub fn new(address: &str, keep_alive: Duration) -> Self {
        Self {
            server_uri: format!("tcp://{address}"),
            keep_alive,
            client: None,
            inbox: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.as_ref().map_or(false, |c| c.is_connected())
    }

    /// Waits up to `timeout` for an inbound message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<mqtt::Message> {
        match &self.inbox {
            Some(inbox) => inbox(timeout),
            None => {
                sleep(timeout);
                None
            }
        }
    }

    fn client(&self) -> Result<&mqtt::Client, TransportError> {
        self.client.as_ref().ok_or(TransportError::NotConnected)
    }
}

impl Transport for PahoTransport {
    fn connect(
        &mut self,
        credentials: &Credentials,
        will: Option<&LastWill>,
    ) -> Result<(), TransportError> {
        let create_opts = mqtt::CreateOptionsBuilder::new()
            .server_uri(&self.server_uri)
            .client_id(&credentials.client_id)
            .finalize();
        let client = mqtt::Client::new(create_opts)
            .map_err(|e| TransportError::Client { message: format!("Error creating mqtt client: {e}") })?;

        let mut conn_opts_builder = mqtt::ConnectOptionsBuilder::new();
        conn_opts_builder
            .keep_alive_interval(self.keep_alive)
            .clean_session(true);
        if let (Some(user), Some(password)) = (&credentials.user, &credentials.password) {
            conn_opts_builder
                .user_name(user)
                .password(password);
        }
        if let Some(will) = will {
            let msg = if will.retain {
                mqtt::Message::new_retained(will.topic.as_str(), will.payload.as_str(), i32::from(will.qos))
            } else {
                mqtt::Message::new(will.topic.as_str(), will.payload.as_str(), i32::from(will.qos))
            };
            conn_opts_builder.will_message(msg);
        }
        let conn_opts = conn_opts_builder.finalize();

        // Consumer must exist before connecting so no message is missed
        let rx = client.start_consuming();
        self.inbox = Some(Box::new(move |timeout| rx.recv_timeout(timeout).ok().flatten()));

        client.connect(conn_opts)
            .map_err(|e| TransportError::Client { message: e.to_string() })?;
        self.client = Some(client);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError> {
        let msg = if retain {
            mqtt::Message::new_retained(topic, payload, 0)
        } else {
            mqtt::Message::new(topic, payload, 0)
        };
        self.client()?
            .publish(msg)
            .map_err(|e| TransportError::Rejected { topic: topic.to_string(), message: e.to_string() })
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.client()?
            .subscribe(topic, 0)
            .map(|_| ())
            .map_err(|e| TransportError::Rejected { topic: topic.to_string(), message: e.to_string() })
    }
}
