//! Seam to the external real-time media client
//!
//! The session controller never touches media or network internals. It asks
//! a [`TransportFactory`] for a fresh [`Transport`] per connect attempt and
//! consumes the event feed that comes with it.

pub mod messages;

use crate::error::{MediaError, TransportError};
use futures::stream::BoxStream;
use std::sync::Arc;

pub use messages::{decode_data_message, DataMessage};

/// Event delivered by a transport, in the order the transport observed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The session with the media server is established
    Connected,

    /// The session ended; `reason` is set when it ended abnormally
    Disconnected { reason: Option<String> },

    /// A data-channel payload from another participant
    DataReceived {
        payload: Vec<u8>,
        sender: Option<String>,
    },

    /// A remote track was subscribed
    TrackSubscribed { participant: String, track: String },
}

/// Options applied when a transport is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Let the server adapt stream quality to what is rendered
    pub adaptive_stream: bool,

    /// Pause publishing layers nobody subscribes to
    pub dynacast: bool,

    /// Log level handed to the media client (e.g. "debug")
    pub log_level: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            adaptive_stream: true,
            dynacast: true,
            log_level: "debug".to_string(),
        }
    }
}

/// Handle to one session with the media server
///
/// Implementations use interior mutability: the controller shares the handle
/// between the connect task and its own message loop.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Establish the session
    async fn connect(&self, url: &str, credential: &str) -> Result<(), TransportError>;

    /// Tear down the session. Calling it on a closed session is allowed.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Start publishing the local camera and microphone
    async fn enable_camera_and_microphone(&self) -> Result<(), MediaError>;

    /// Transport name for logging
    fn name(&self) -> &str;
}

/// Event feed paired with a transport
pub type TransportEvents = BoxStream<'static, TransportEvent>;

/// Creates transports for new connect attempts
pub trait TransportFactory: Send + Sync {
    fn create(&self, options: &TransportOptions) -> (Arc<dyn Transport>, TransportEvents);
}

/// Caller-supplied routine that replaces the default media enabling
#[async_trait::async_trait]
pub trait MediaEnabler: Send + Sync {
    async fn enable_media(&self, transport: Arc<dyn Transport>) -> Result<(), MediaError>;
}
