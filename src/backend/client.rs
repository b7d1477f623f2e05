use super::messages::{
    join_room_expression, EngineRecord, JoinRoomOutput, PixelRequest, PixelResponse, RoomRecord,
    LIST_ENGINES_EXPRESSION, LIST_ROOMS_EXPRESSION,
};
use super::traits::{EngineCatalog, RoomDirectory, TokenIssuer};
use crate::config::BackendConfig;
use crate::error::{BackendError, CatalogError, DirectoryError, IssuanceError};
use crate::models::{AccessGrant, Engine, OperationMode, RoomSummary};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Path of the expression endpoint, relative to the backend base URL
const EXPRESSION_PATH: &str = "/api/engine/runPixel";

/// HTTP client for the backend's expression RPC surface
///
/// One client serves token issuance, the room directory and the engine
/// catalog.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    endpoint: String,
}

impl BackendClient {
    /// Build a client for the backend described by `config`
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(5)))
            .build()?;

        let endpoint = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            EXPRESSION_PATH
        );

        info!("Backend client targeting {}", endpoint);

        Ok(Self { client, endpoint })
    }

    /// Run one expression and return the output of its first result
    async fn run_expression(&self, expression: &str) -> Result<serde_json::Value, BackendError> {
        debug!("Running backend expression: {}", expression);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&PixelRequest {
                expression: expression.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Backend returned an error status");
            return Err(BackendError::Status(status.as_u16()));
        }

        let envelope: PixelResponse = response.json().await?;

        if !envelope.errors.is_empty() {
            return Err(BackendError::Reported(envelope.errors.join("")));
        }

        envelope
            .pixel_return
            .into_iter()
            .next()
            .map(|ret| ret.output)
            .ok_or(BackendError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl TokenIssuer for BackendClient {
    #[instrument(skip(self))]
    async fn request_token(
        &self,
        engine_id: &str,
        operation: OperationMode,
        room_name: &str,
    ) -> Result<AccessGrant, IssuanceError> {
        if room_name.trim().is_empty() {
            return Err(IssuanceError::EmptyRoomName);
        }

        let expression = join_room_expression(engine_id, operation.as_str(), room_name);
        let output = self.run_expression(&expression).await?;

        let parsed: JoinRoomOutput = serde_json::from_value(output)
            .map_err(|e| BackendError::Payload(e.to_string()))?;

        let credential = parsed
            .jwt
            .filter(|jwt| !jwt.is_empty())
            .ok_or(IssuanceError::MissingCredential)?;

        info!("Issued access token for room {}", room_name);

        Ok(AccessGrant {
            credential,
            room_id: parsed.room_id,
        })
    }
}

#[async_trait::async_trait]
impl RoomDirectory for BackendClient {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, DirectoryError> {
        let output = self.run_expression(LIST_ROOMS_EXPRESSION).await?;
        if output.is_null() {
            return Ok(Vec::new());
        }

        let records: Vec<RoomRecord> = serde_json::from_value(output)
            .map_err(|e| BackendError::Payload(e.to_string()))?;

        debug!("Room directory returned {} rooms", records.len());

        Ok(records.into_iter().map(RoomSummary::from).collect())
    }
}

#[async_trait::async_trait]
impl EngineCatalog for BackendClient {
    async fn list_engines(&self) -> Result<Vec<Engine>, CatalogError> {
        let output = self.run_expression(LIST_ENGINES_EXPRESSION).await?;
        if output.is_null() {
            return Ok(Vec::new());
        }

        let records: Vec<EngineRecord> = serde_json::from_value(output)
            .map_err(|e| BackendError::Payload(e.to_string()))?;

        let engines: Vec<Engine> = records
            .into_iter()
            .filter(EngineRecord::is_audio)
            .filter_map(|record| {
                let engine = record.into_engine();
                if engine.is_none() {
                    warn!("Skipping audio engine without id or name");
                }
                engine
            })
            .collect();

        debug!("Engine catalog returned {} audio engines", engines.len());

        Ok(engines)
    }
}
