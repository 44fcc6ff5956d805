/// Error types shared across MCP server crates.
///
/// These errors represent failures in infrastructure components (git subprocesses,
/// HTTP transport) that are common to multiple MCP servers. Application-specific errors
/// should be defined in each server crate and wrap `CommonError` via `#[from]`.
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("failed to spawn git: {0}")]
    GitSpawn(#[source] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    GitFailed { command: String, stderr: String },

    #[error("git {command} timed out after {}s", timeout.as_secs())]
    GitTimeout { command: String, timeout: Duration },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
