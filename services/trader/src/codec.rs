//! Line codec: one compact JSON record per line.
//!
//! `decode` is strict about required fields, message kinds and enumerated
//! values; unrecognised extra fields are ignored. `encode` emits exactly the
//! fields of the message kind, no whitespace, and a single trailing newline.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProtocolError;

/// Decode one wire line into a typed message.
pub fn decode<M: DeserializeOwned>(line: &str) -> Result<M, ProtocolError> {
    let trimmed = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    serde_json::from_str(trimmed).map_err(|e| ProtocolError::Malformed {
        line: trimmed.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a raw wire line; bytes that are not UTF-8 are malformed.
pub fn decode_bytes<M: DeserializeOwned>(line: &[u8]) -> Result<M, ProtocolError> {
    let text = std::str::from_utf8(line).map_err(|e| ProtocolError::Malformed {
        line: String::from_utf8_lossy(line).into_owned(),
        reason: e.to_string(),
    })?;
    decode(text)
}

/// Encode a message into one wire line, newline included.
pub fn encode<M: Serialize>(message: &M) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(message).map_err(|e| ProtocolError::Encode(e.to_string()))?;
    line.push('\n');
    Ok(line)
}
