use std::path::PathBuf;

use mcp_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    /// The initial clone failed, so no working copy exists to serve from.
    #[error("repository unavailable: {0}")]
    RepositoryUnavailable(#[source] CommonError),

    /// A pull failed on an existing working copy; the old content is still served.
    #[error("repository stale: {0}")]
    RepositoryStale(#[source] CommonError),

    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("guideline document not found: {}: {source}", path.display())]
    DocumentNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("platform not configured: {0}")]
    PlatformNotConfigured(String),
}
