use crate::models::{Engine, OperationMode, RoomSummary};
use serde::Serialize;

/// Where the controller is in the session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Connecting,
    Connected,
    MediaEnabling,
    DisconnectedWithError,
}

impl SessionPhase {
    /// A session is pending or live
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionPhase::Connecting | SessionPhase::Connected | SessionPhase::MediaEnabling
        )
    }

    /// A live session handle exists
    pub fn has_session(&self) -> bool {
        matches!(self, SessionPhase::Connected | SessionPhase::MediaEnabling)
    }
}

/// Read-only projection of controller state published to observers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,

    /// Room of the pending or live session
    pub room_name: Option<String>,

    /// Room identifier assigned by the backend, once known
    pub room_id: Option<String>,

    pub selected_engine: Option<Engine>,
    pub selected_operation: OperationMode,

    /// Most recent failure, cleared when the next connect attempt starts
    pub last_error: Option<String>,

    pub transcript: String,
    pub transcript_words: usize,

    /// Remote tracks subscribed during the current session
    pub subscribed_tracks: usize,

    pub rooms: Vec<RoomSummary>,
    pub rooms_loading: bool,

    pub engines: Vec<Engine>,
    pub engines_loading: bool,

    /// Engine catalog failure, kept apart from the session error
    pub engines_error: Option<String>,
}

impl SessionSnapshot {
    pub fn has_session(&self) -> bool {
        self.phase.has_session()
    }
}
