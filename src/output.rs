//! Response payloads sent back to the peer
//!
//! Exactly one response is written per request. Each variant serializes to
//! a fixed JSON shape with no tag field.

use serde::Serialize;
use std::collections::BTreeMap;

/// Code for every refused or unanswerable request
pub const CODE_REJECTED: u32 = 1000;

/// Code for an allowed program that failed
pub const CODE_EXEC_FAILED: u32 = 5;

/// Message used when a command fails without writing to stderr
pub const GENERIC_EXEC_FAILURE: &str = "Command failed without output";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Error {
        error: String,
        #[serde(rename = "cmd", skip_serializing_if = "Option::is_none")]
        command: Option<String>,
        code: u32,
    },
    Version {
        version: String,
    },
    Exec {
        code: u32,
        stdout: String,
        stderr: String,
    },
    Env {
        env: BTreeMap<String, String>,
    },
    Spec {
        version: String,
        env: BTreeMap<String, String>,
        separator: String,
        tmpdir: String,
    },
}

impl Response {
    /// Exec request refused by the allowlist
    pub fn unsafe_exec() -> Self {
        Response::Error {
            error: "Unsafe exec detected, ignored".to_string(),
            command: None,
            code: CODE_REJECTED,
        }
    }

    pub fn unknown_command(command: &str) -> Self {
        Response::Error {
            error: "cmd is unknown".to_string(),
            command: Some(command.to_string()),
            code: CODE_REJECTED,
        }
    }

    pub fn unsupported_command(command: &str) -> Self {
        Response::Error {
            error: "cmd is not supported".to_string(),
            command: Some(command.to_string()),
            code: CODE_REJECTED,
        }
    }

    pub fn malformed_request() -> Self {
        Response::Error {
            error: "message could not be decoded".to_string(),
            command: None,
            code: CODE_REJECTED,
        }
    }

    pub fn oversized_request(max: usize) -> Self {
        Response::Error {
            error: format!("message exceeds {} bytes", max),
            command: None,
            code: CODE_REJECTED,
        }
    }

    pub fn exec_ok(stdout: String) -> Self {
        Response::Exec {
            code: 0,
            stdout,
            stderr: String::new(),
        }
    }

    pub fn exec_failed(stdout: String, stderr: String) -> Self {
        Response::Exec {
            code: CODE_EXEC_FAILED,
            stdout,
            stderr,
        }
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Serialize to JSON bytes
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|_| b"{}".to_vec())
    }
}
