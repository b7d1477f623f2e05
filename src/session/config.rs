use crate::config::Config;
use crate::transport::TransportOptions;

/// Configuration for a session controller
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Media server URL, read at every connect attempt
    /// A missing URL fails that attempt only
    pub server_url: Option<String>,

    /// Options handed to the transport factory for each new session
    pub transport: TransportOptions,

    /// Prefix for synthesized room names ("room" -> "room-1700000000000")
    pub room_name_prefix: String,

    /// Capacity of the intent mailbox
    pub mailbox_capacity: usize,

    /// Load the engine catalog and room directory as soon as the controller starts
    pub load_on_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            transport: TransportOptions::default(),
            room_name_prefix: "room".to_string(),
            mailbox_capacity: 64,
            load_on_start: true,
        }
    }
}

impl SessionConfig {
    /// Derive the controller configuration from the process configuration
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            server_url: cfg.transport.server_url.clone(),
            transport: TransportOptions {
                adaptive_stream: cfg.transport.adaptive_stream,
                dynacast: cfg.transport.dynacast,
                log_level: cfg.logging.transport_level.clone(),
            },
            ..Self::default()
        }
    }
}
