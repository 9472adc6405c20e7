//! JSON encoding of snapshots for tooling and recordings.

use std::fmt;

use crate::types::*;

/// Serialization errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Snapshot could not be encoded
    Encode(String),
    /// Input is not a valid snapshot
    InvalidData(String),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::Encode(msg) => write!(f, "Failed to encode snapshot: {}", msg),
            SerializationError::InvalidData(msg) => write!(f, "Invalid snapshot data: {}", msg),
        }
    }
}

impl std::error::Error for SerializationError {}

impl Snapshot {
    /// Encode as a single-line JSON object
    pub fn to_json(&self) -> Result<String, SerializationError> {
        serde_json::to_string(self).map_err(|e| SerializationError::Encode(e.to_string()))
    }

    /// Decode a snapshot produced by [`Snapshot::to_json`]
    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        serde_json::from_str(json).map_err(|e| SerializationError::InvalidData(e.to_string()))
    }
}

/// Encode a sequence of snapshots as JSON lines
pub fn encode_lines<'a>(
    snapshots: impl IntoIterator<Item = &'a Snapshot>,
) -> Result<String, SerializationError> {
    let mut out = String::new();
    for snapshot in snapshots {
        out.push_str(&snapshot.to_json()?);
        out.push('\n');
    }
    Ok(out)
}

/// Decode JSON lines, skipping blank lines
pub fn decode_lines(input: &str) -> Result<Vec<Snapshot>, SerializationError> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(Snapshot::from_json)
        .collect()
}
