//! Request decoding for the native messaging channel
//!
//! Parses the JSON payload of one frame.

use serde::{Deserialize, Deserializer};

use crate::rules::nullable_list;

/// The `command` field of an exec request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecCommand {
    /// Field absent
    #[default]
    Missing,

    /// Field present but not a string (number, object, null, ...)
    NonString,

    Named(String),
}

impl<'de> Deserialize<'de> for ExecCommand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(name) => ExecCommand::Named(name),
            _ => ExecCommand::NonString,
        })
    }
}

/// One decoded request
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingRequest {
    /// Request kind ("exec", "version", ...)
    #[serde(rename = "cmd")]
    pub kind: String,

    /// Program requested by an exec
    #[serde(default)]
    pub command: ExecCommand,

    /// Accepted for compatibility; not used when matching
    #[serde(default)]
    pub kill: bool,

    #[serde(default, deserialize_with = "nullable_list")]
    pub arguments: Vec<String>,
}

/// Result of decoding a payload
#[derive(Debug, Clone)]
pub enum Request {
    Parsed(IncomingRequest),

    /// Not valid JSON, or missing/mistyped fields. Never reaches the validator.
    Malformed(String),
}

impl IncomingRequest {
    /// Parse input from JSON bytes
    pub fn from_json(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Get a summary of the request for logging
    pub fn summary(&self) -> String {
        match &self.command {
            ExecCommand::Named(name) => {
                format!("{}: {} {:?}", self.kind, name, self.arguments)
            }
            ExecCommand::NonString => format!("{}: <non-string command>", self.kind),
            ExecCommand::Missing => self.kind.clone(),
        }
    }
}

impl Request {
    /// Decode a frame payload. Never fails; bad input becomes `Malformed`.
    pub fn decode(payload: &[u8]) -> Self {
        match IncomingRequest::from_json(payload) {
            Ok(request) => Request::Parsed(request),
            Err(e) => Request::Malformed(e.to_string()),
        }
    }
}
