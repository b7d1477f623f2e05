use crate::error::{CatalogError, DirectoryError, IssuanceError};
use crate::models::{AccessGrant, Engine, OperationMode, RoomSummary};

/// Issues short-lived credentials for joining a room
#[async_trait::async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Request a credential for `room_name`
    ///
    /// `room_name` must be non-empty; callers synthesize one when the user
    /// did not provide any.
    async fn request_token(
        &self,
        engine_id: &str,
        operation: OperationMode,
        room_name: &str,
    ) -> Result<AccessGrant, IssuanceError>;
}

/// Lists the rooms currently active on the media server
#[async_trait::async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Full snapshot of active rooms, in backend order
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, DirectoryError>;
}

/// Lists the engines that can process audio
#[async_trait::async_trait]
pub trait EngineCatalog: Send + Sync {
    /// Audio-capable engines only, in backend order
    async fn list_engines(&self) -> Result<Vec<Engine>, CatalogError>;
}
