use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A selectable audio-processing engine (e.g. a transcription model)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    pub id: String,
    pub name: String,
}

/// Snapshot of one active room as reported by the room directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub name: String,

    /// When the room was created
    pub creation_time: DateTime<Utc>,

    pub num_participants: u32,

    /// Zero means the server imposes no limit
    pub max_participants: u32,

    /// Whether the room is currently being recorded
    pub active_recording: bool,
}

/// Credential issued for joining a room
#[derive(Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// Short-lived access token handed to the transport
    pub credential: String,

    /// Room identifier assigned by the backend
    pub room_id: Option<String>,
}

impl fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGrant")
            .field("credential", &"[REDACTED]")
            .field("room_id", &self.room_id)
            .finish()
    }
}

/// Transcription strategy requested for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    #[default]
    TurnBasedTranscription,
    RealTimeTranscription,
}

impl OperationMode {
    /// Every mode, in the order they are offered to the user
    pub const ALL: [OperationMode; 2] = [
        OperationMode::TurnBasedTranscription,
        OperationMode::RealTimeTranscription,
    ];

    /// Identifier sent to the token backend
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationMode::TurnBasedTranscription => "turn_based_transcription",
            OperationMode::RealTimeTranscription => "real_time_transcription",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OperationMode::TurnBasedTranscription => "Turn-Based Transcription",
            OperationMode::RealTimeTranscription => "Real-Time Transcription",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown operation mode: {}", s))
    }
}
