//! Messages exchanged with the session controller actor.

use crate::error::{CatalogError, DirectoryError, MediaError, SessionError};
use crate::models::{Engine, OperationMode, RoomSummary};
use crate::transport::{Transport, TransportEvent};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Reply channel carrying whether an intent was accepted
pub(crate) type Reply = oneshot::Sender<Result<(), SessionError>>;

/// Intents dispatched by the presentation layer
pub(crate) enum ControllerMessage {
    Connect {
        room_name: Option<String>,
        respond_to: Reply,
    },
    Disconnect {
        respond_to: Reply,
    },
    EnableMedia {
        respond_to: Reply,
    },
    SelectEngine {
        engine: Engine,
        respond_to: Reply,
    },
    SelectEngineById {
        engine_id: String,
        respond_to: Reply,
    },
    SelectOperation {
        operation: OperationMode,
        respond_to: Reply,
    },
    RefreshRooms {
        respond_to: Reply,
    },
    RefreshEngines {
        respond_to: Reply,
    },
    ClearTranscript {
        respond_to: Reply,
    },
    Shutdown {
        respond_to: oneshot::Sender<()>,
    },
}

/// Results of background work, fed back into the actor
///
/// Connect, media and transport results carry the attempt id they belong to;
/// listings carry a request id. The actor drops anything that is no longer
/// current.
pub(crate) enum TaskEvent {
    ConnectResolved {
        attempt: u64,
        transport: Arc<dyn Transport>,
        result: Result<Option<String>, SessionError>,
    },
    Transport {
        attempt: u64,
        event: TransportEvent,
    },
    TransportClosed {
        attempt: u64,
    },
    MediaResolved {
        attempt: u64,
        result: Result<(), MediaError>,
    },
    RoomsLoaded {
        request: u64,
        result: Result<Vec<RoomSummary>, DirectoryError>,
    },
    EnginesLoaded {
        request: u64,
        result: Result<Vec<Engine>, CatalogError>,
    },
}
