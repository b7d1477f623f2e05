//! Error types for the room session client.
//!
//! Backend failures are wrapped per call so callers can tell a failed token
//! issuance apart from a failed room listing. Everything that can end a
//! connect attempt is folded into [`SessionError`], whose `Display` output is
//! the text shown in the session's error slot.

use thiserror::Error;

/// Failure talking to the backend RPC surface.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned HTTP {0}")]
    Status(u16),

    /// The backend reported one or more errors in its response envelope.
    #[error("{0}")]
    Reported(String),

    /// The envelope had no return value to read.
    #[error("backend response contained no output")]
    EmptyResponse,

    /// The output did not have the expected shape.
    #[error("unexpected backend payload: {0}")]
    Payload(String),
}

/// Token issuance failed.
#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("token response is missing the access credential")]
    MissingCredential,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Room directory listing failed.
#[derive(Debug, Error)]
#[error("failed to list rooms: {0}")]
pub struct DirectoryError(#[from] pub BackendError);

/// Engine catalog listing failed.
#[derive(Debug, Error)]
#[error("failed to load audio models: {0}")]
pub struct CatalogError(#[from] pub BackendError);

/// Failure reported by the real-time transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to room: {0}")]
    Connect(String),

    #[error("failed to disconnect from room: {0}")]
    Disconnect(String),

    #[error("transport event feed closed")]
    FeedClosed,
}

/// Enabling local capture failed. Never fatal to the session.
#[derive(Debug, Error)]
#[error("failed to enable camera and microphone: {0}")]
pub struct MediaError(pub String);

/// Errors surfaced by the session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A required setting is absent. Fatal to the current attempt only.
    #[error("{0} is not configured")]
    Configuration(&'static str),

    #[error("No audio model selected")]
    NoEngineSelected,

    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Media(#[from] MediaError),

    /// A connect intent arrived while another session is pending or live.
    #[error("a session is already active")]
    AlreadyActive,

    #[error("not connected to a room")]
    NotConnected,

    #[error("camera and microphone are already being enabled")]
    MediaPending,

    /// Engine and operation are fixed for the lifetime of a session.
    #[error("selection cannot change while a session is active")]
    SelectionLocked,

    #[error("unknown audio model: {0}")]
    UnknownEngine(String),

    #[error("session controller has shut down")]
    Closed,
}

/// A data-channel payload that could not be read as a data message.
#[derive(Debug, Error)]
pub enum DataMessageError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not a valid data message: {0}")]
    Json(#[from] serde_json::Error),
}
