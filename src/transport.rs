use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum TransportError {
    #[snafu(display("Not connected to broker"))]
    NotConnected,

    #[snafu(display("Broker client error: {message}"))]
    Client { message: String },

    #[snafu(display("Message to '{topic}' was not accepted: {message}"))]
    Rejected { topic: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            user: None,
            password: None,
        }
    }

    pub fn with_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }
}

/// Message the broker publishes on our behalf after an unclean disconnect.
#[derive(Debug, Clone, PartialEq)]
pub struct LastWill {
    pub topic: String,
    pub payload: String,
    pub qos: u8,
    pub retain: bool,
}

/// Publish/subscribe client the entities talk through.
///
/// Calls return synchronously with the broker client's verdict. Delivery is
/// at-most-once; nothing above this trait retries.
pub trait Transport {
    fn connect(
        &mut self,
        credentials: &Credentials,
        will: Option<&LastWill>,
    ) -> Result<(), TransportError>;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), TransportError>;

    /// Zero-length publish, which clears a retained topic.
    ///
    /// Kept separate from [`Transport::publish`] so clients that treat an
    /// empty payload specially can override it.
    fn publish_empty(&mut self, topic: &str, retain: bool) -> Result<(), TransportError> {
        self.publish(topic, &[], retain)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;
}
