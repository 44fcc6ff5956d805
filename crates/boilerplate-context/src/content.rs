/// Platform-scoped reads from the working copy: directory listings and guideline documents.
///
/// Nothing is cached here. Every call goes back to the filesystem, so content is exactly as
/// fresh as the last successful refresh of the working copy.
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::model::Platform;
use mcp_common::error::CommonError;

/// Dependency-manager directory skipped in structure listings.
const DEPENDENCY_DIR: &str = "node_modules";

#[derive(Debug, Clone)]
pub struct ContentReader {
    root: PathBuf,
    guideline_file: String,
}

impl ContentReader {
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.repo_dir.join(&config.subdir),
            guideline_file: config.guideline_file.clone(),
        }
    }

    pub fn platform_dir(&self, platform: Platform) -> PathBuf {
        self.root.join(platform.as_str())
    }

    pub fn guideline_path(&self, platform: Platform) -> PathBuf {
        self.platform_dir(platform).join(&self.guideline_file)
    }

    /// Depth-first listing of a platform subtree, relative to the platform directory.
    ///
    /// Directories carry a trailing `/` and are immediately followed by their children.
    /// Siblings appear in the order the filesystem returns them.
    pub async fn directory_structure(&self, platform: Platform) -> Result<Vec<String>, AppError> {
        let dir = self.platform_dir(platform);
        let entries = tokio::task::spawn_blocking(move || list_tree(&dir))
            .await
            .map_err(|e| CommonError::Io(io::Error::other(e)))??;
        debug!(%platform, entries = entries.len(), "listed boilerplate structure");
        Ok(entries)
    }

    /// Read the platform's guideline document. A missing or unreadable file is an error.
    pub async fn read_guideline(&self, platform: Platform) -> Result<String, AppError> {
        let path = self.guideline_path(platform);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| AppError::DocumentNotFound { path, source })
    }
}

fn list_tree(dir: &Path) -> Result<Vec<String>, AppError> {
    if !dir.is_dir() {
        return Err(AppError::DirectoryNotFound(dir.to_path_buf()));
    }
    let mut entries = Vec::new();
    walk(dir, "", &mut entries).map_err(CommonError::from)?;
    Ok(entries)
}

fn walk(dir: &Path, prefix: &str, entries: &mut Vec<String>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_excluded(&name) {
            continue;
        }

        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        // file_type() does not follow symlinks, so a linked directory is listed as a leaf.
        if entry.file_type()?.is_dir() {
            entries.push(format!("{relative}/"));
            walk(&entry.path(), &relative, entries)?;
        } else {
            entries.push(relative);
        }
    }
    Ok(())
}

fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || name == DEPENDENCY_DIR
}
