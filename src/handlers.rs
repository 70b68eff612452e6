//! Fixed responses for the non-exec commands

use std::collections::BTreeMap;

use crate::output::Response;

/// Version reported to the peer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build number written to the log at startup
pub const BUILD: &str = "3";

/// Commands older clients may send that this host does not implement
pub const UNSUPPORTED: &[&str] = &[
    "echo",
    "spawn",
    "clean-tmp",
    "ifup",
    "dir",
    "save-data",
    "net",
    "copy",
    "remove",
    "move",
];

/// Environment variables reported by `env` and `spec`
const REPORTED_VARS: &[&str] = &["TMP", "TEMP"];

pub fn is_unsupported(kind: &str) -> bool {
    UNSUPPORTED.contains(&kind)
}

pub fn version() -> Response {
    Response::Version {
        version: VERSION.to_string(),
    }
}

pub fn env() -> Response {
    env_with(|name| std::env::var(name).ok())
}

pub fn spec() -> Response {
    spec_with(|name| std::env::var(name).ok())
}

/// `env` response built from an arbitrary variable lookup
pub fn env_with<F>(lookup: F) -> Response
where
    F: Fn(&str) -> Option<String>,
{
    Response::Env {
        env: reported_env(&lookup),
    }
}

/// `spec` response built from an arbitrary variable lookup
pub fn spec_with<F>(lookup: F) -> Response
where
    F: Fn(&str) -> Option<String>,
{
    Response::Spec {
        version: VERSION.to_string(),
        env: reported_env(&lookup),
        separator: std::path::MAIN_SEPARATOR.to_string(),
        tmpdir: lookup("TMP").unwrap_or_default(),
    }
}

fn reported_env<F>(lookup: &F) -> BTreeMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    REPORTED_VARS
        .iter()
        .map(|name| (name.to_string(), lookup(name).unwrap_or_default()))
        .collect()
}
