use crate::models::{Engine, RoomSummary};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Expression that lists every active room on the media server
pub const LIST_ROOMS_EXPRESSION: &str = "LiveKitListRoomsAdmin()";

/// Expression that lists the caller's model engines
pub const LIST_ENGINES_EXPRESSION: &str = r#"MyEngines(engineTypes = [ "MODEL" ]);"#;

/// Tag the backend puts on engines that accept audio
pub const AUDIO_ENGINE_TAG: &str = "audio";

/// Request body for the backend's expression endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct PixelRequest {
    pub expression: String,
}

/// Response envelope returned for every expression
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelResponse {
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub pixel_return: Vec<PixelReturn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PixelReturn {
    #[serde(default)]
    pub output: serde_json::Value,
}

/// Output of the join-room expression
#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomOutput {
    pub jwt: Option<String>,
    #[serde(rename = "roomId")]
    pub room_id: Option<String>,
}

/// One room as serialized by the directory expression
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomRecord {
    #[serde(rename = "name_")]
    pub name: String,
    /// Unix milliseconds
    #[serde(rename = "creationTime_", default)]
    pub creation_time: i64,
    #[serde(rename = "numParticipants_", default)]
    pub num_participants: u32,
    #[serde(rename = "maxParticipants_", default)]
    pub max_participants: u32,
    #[serde(rename = "activeRecording_", default)]
    pub active_recording: bool,
}

impl From<RoomRecord> for RoomSummary {
    fn from(record: RoomRecord) -> Self {
        let creation_time = Utc
            .timestamp_millis_opt(record.creation_time)
            .single()
            .unwrap_or_default();

        RoomSummary {
            name: record.name,
            creation_time,
            num_participants: record.num_participants,
            max_participants: record.max_participants,
            active_recording: record.active_recording,
        }
    }
}

/// One engine as serialized by the catalog expression
#[derive(Debug, Serialize, Deserialize)]
pub struct EngineRecord {
    pub database_id: Option<String>,
    pub database_name: Option<String>,
    pub tag: Option<String>,
}

impl EngineRecord {
    pub fn is_audio(&self) -> bool {
        self.tag.as_deref() == Some(AUDIO_ENGINE_TAG)
    }

    /// Convert to an [`Engine`], or `None` when id or name is missing
    pub fn into_engine(self) -> Option<Engine> {
        Some(Engine {
            id: self.database_id?,
            name: self.database_name?,
        })
    }
}

/// Build the join-room expression for a token request
pub fn join_room_expression(engine_id: &str, operation: &str, room_name: &str) -> String {
    format!(
        "LiveKitJoinRoom(engine=[{}], operation=[{}], roomId=[{}])",
        quote(engine_id),
        quote(operation),
        quote(room_name)
    )
}

/// Quote a string argument, escaping backslashes and double quotes
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
