use crate::error::DataMessageError;
use serde::{Deserialize, Serialize};

/// Structured record carried in a data-channel payload
///
/// Only transcription records are understood. Anything else decodes to
/// [`DataMessage::Other`] so newer message types never break a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataMessage {
    /// A fragment of transcribed speech
    Transcription { text: String },

    #[serde(other)]
    Other,
}

/// Decode a raw payload as UTF-8 JSON
pub fn decode_data_message(payload: &[u8]) -> Result<DataMessage, DataMessageError> {
    let text = std::str::from_utf8(payload)?;
    Ok(serde_json::from_str(text)?)
}
