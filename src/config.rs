use anyhow::Result;
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `ROOM_SCRIBE__TRANSPORT__SERVER_URL`
pub const ENV_PREFIX: &str = "ROOM_SCRIBE";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Media server URL; a connect attempt fails when it is absent
    pub server_url: Option<String>,
    pub adaptive_stream: bool,
    pub dynacast: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter for this process, overridden by `RUST_LOG`
    pub level: String,
    /// Log level handed to the media client
    pub transport_level: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "room-scribe")?
            .set_default("backend.timeout_secs", 10)?
            .set_default("transport.adaptive_stream", true)?
            .set_default("transport.dynacast", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.transport_level", "debug")?
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
