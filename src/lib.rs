pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use backend::{BackendClient, EngineCatalog, RoomDirectory, TokenIssuer};
pub use config::Config;
pub use error::{
    BackendError, CatalogError, DataMessageError, DirectoryError, IssuanceError, MediaError,
    SessionError, TransportError,
};
pub use models::{AccessGrant, Engine, OperationMode, RoomSummary};
pub use session::{SessionConfig, SessionController, SessionPhase, SessionServices, SessionSnapshot};
pub use transport::{
    DataMessage, MediaEnabler, Transport, TransportEvent, TransportEvents, TransportFactory,
    TransportOptions,
};
