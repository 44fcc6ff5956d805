/// Local working copy of the boilerplates repository.
///
/// `ensure` clones the remote on first use and pulls on later calls. Clone failures are
/// fatal (`RepositoryUnavailable`); pull failures are logged and the existing working copy
/// keeps being served. Clone and pull never run concurrently: the whole sequence is held
/// under one async mutex, regardless of how many requests are in flight.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppError;
use mcp_common::error::CommonError;
use mcp_common::git::GitClient;

/// Outcome of a successful [`RepoCache::ensure`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The working copy did not exist and was cloned.
    Cloned,
    /// The working copy was pulled.
    Pulled,
    /// The last refresh is younger than the refresh interval.
    Skipped,
    /// The pull failed; the previous content is served as-is.
    Stale,
}

pub struct RepoCache {
    url: String,
    dir: PathBuf,
    refresh_interval: Duration,
    git: Arc<dyn GitClient>,
    /// Guards clone/pull. Holds the time of the last successful refresh.
    last_refresh: Mutex<Option<Instant>>,
}

impl RepoCache {
    pub fn new(config: &Config, git: Arc<dyn GitClient>) -> Self {
        Self {
            url: config.repo_url.clone(),
            dir: config.repo_dir.clone(),
            refresh_interval: config.refresh_interval,
            git,
            last_refresh: Mutex::new(None),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Make sure the working copy exists and is as fresh as the remote allows.
    pub async fn ensure(&self) -> Result<Refresh, AppError> {
        let mut last_refresh = self.last_refresh.lock().await;

        if !self.is_checkout().await? {
            self.clone_into_place().await?;
            *last_refresh = Some(Instant::now());
            return Ok(Refresh::Cloned);
        }

        if let Some(at) = *last_refresh {
            if !self.refresh_interval.is_zero() && at.elapsed() < self.refresh_interval {
                debug!(age_ms = at.elapsed().as_millis() as u64, "working copy fresh, skipping pull");
                return Ok(Refresh::Skipped);
            }
        }

        match self.git.pull(&self.dir).await {
            Ok(()) => {
                *last_refresh = Some(Instant::now());
                debug!(dir = %self.dir.display(), "pull complete");
                Ok(Refresh::Pulled)
            }
            Err(e) => {
                let err = AppError::RepositoryStale(e);
                warn!(error = %err, dir = %self.dir.display(), "pull failed, serving cached working copy");
                Ok(Refresh::Stale)
            }
        }
    }

    /// A working copy counts as present only once its `.git` entry exists.
    async fn is_checkout(&self) -> Result<bool, AppError> {
        Ok(tokio::fs::try_exists(self.dir.join(".git"))
            .await
            .map_err(CommonError::from)?)
    }

    /// Sibling directory the clone is written to before it is moved into place.
    fn staging_dir(&self) -> PathBuf {
        let name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repo".to_string());
        self.dir.with_file_name(format!(".{name}.partial"))
    }

    /// Clone into the staging directory and rename it over `dir` on success.
    ///
    /// A clone that fails or times out leaves nothing behind at `dir`, so later calls
    /// retry the clone instead of pulling into a half-written checkout.
    async fn clone_into_place(&self) -> Result<(), AppError> {
        let staging = self.staging_dir();
        remove_leftover(&staging).await;

        info!(url = %self.url, dir = %self.dir.display(), "cloning repository");
        if let Err(e) = self.git.clone_repo(&self.url, &staging).await {
            remove_leftover(&staging).await;
            return Err(AppError::RepositoryUnavailable(e));
        }

        // An empty directory (e.g. a pre-created mount point) may stand where the
        // checkout goes. Anything non-empty makes the rename fail below.
        if tokio::fs::try_exists(&self.dir).await.map_err(CommonError::from)? {
            let _ = tokio::fs::remove_dir(&self.dir).await;
        }
        if let Err(e) = tokio::fs::rename(&staging, &self.dir).await {
            remove_leftover(&staging).await;
            return Err(AppError::RepositoryUnavailable(CommonError::Io(e)));
        }

        info!(dir = %self.dir.display(), "clone complete");
        Ok(())
    }

    /// HEAD commit of the working copy, for diagnostics.
    pub async fn head_commit(&self) -> Result<String, AppError> {
        Ok(self.git.head_commit(&self.dir).await?)
    }
}

async fn remove_leftover(path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => debug!(path = %path.display(), "removed partial clone"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(error = %e, path = %path.display(), "failed to remove partial clone"),
    }
}
