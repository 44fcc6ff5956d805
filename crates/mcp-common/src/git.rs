/// Git subprocess client used to mirror guideline repositories.
///
/// Every invocation is bounded by a timeout; a subprocess that outlives it is killed.
/// The client itself does not serialize calls. Callers that share a working copy must
/// hold their own lock around clone/pull sequences.
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::CommonError;

/// Version-control operations needed to keep a read-only mirror current.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Clone `url` into `dest`. `dest` must not exist yet.
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CommonError>;

    /// Fast-forward the working copy at `repo` to its upstream tip.
    async fn pull(&self, repo: &Path) -> Result<(), CommonError>;

    /// Current HEAD commit hash of the working copy at `repo`.
    async fn head_commit(&self, repo: &Path) -> Result<String, CommonError>;
}

/// `GitClient` backed by the `git` executable on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    timeout: Duration,
}

impl GitCli {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, name: &str, mut cmd: Command) -> Result<String, CommonError> {
        // Never block on a credential prompt; a private remote without credentials fails fast.
        cmd.env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(command = name, timeout_secs = self.timeout.as_secs(), "running git");
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| CommonError::GitTimeout {
                command: name.to_string(),
                timeout: self.timeout,
            })?
            .map_err(CommonError::GitSpawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CommonError::GitFailed {
                command: name.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl GitClient for GitCli {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), CommonError> {
        let mut cmd = Command::new("git");
        cmd.arg("clone").arg("--").arg(url).arg(dest);
        self.run("clone", cmd).await.map(|_| ())
    }

    async fn pull(&self, repo: &Path) -> Result<(), CommonError> {
        let mut cmd = Command::new("git");
        cmd.arg("pull").arg("--ff-only").current_dir(repo);
        self.run("pull", cmd).await.map(|_| ())
    }

    async fn head_commit(&self, repo: &Path) -> Result<String, CommonError> {
        let mut cmd = Command::new("git");
        cmd.arg("rev-parse").arg("HEAD").current_dir(repo);
        self.run("rev-parse", cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn git(dir: &Path, args: &[&str]) -> bool {
        StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Create a repository with one commit. Returns `false` when git is unavailable.
    fn init_origin(dir: &Path) -> bool {
        if !git(dir, &["init", "-q"]) {
            return false;
        }
        std::fs::write(dir.join("README.md"), "hello\n").unwrap();
        git(dir, &["add", "."])
            && git(
                dir,
                &[
                    "-c",
                    "user.name=Test User",
                    "-c",
                    "user.email=test@example.com",
                    "commit",
                    "-q",
                    "-m",
                    "initial",
                ],
            )
    }

    #[tokio::test]
    async fn clone_then_pull_round_trip() {
        let origin = tempfile::tempdir().unwrap();
        if !init_origin(origin.path()) {
            eprintln!("git not available, skipping");
            return;
        }
        let scratch = tempfile::tempdir().unwrap();
        let dest = scratch.path().join("mirror");
        let client = GitCli::new(Duration::from_secs(30));

        client
            .clone_repo(origin.path().to_str().unwrap(), &dest)
            .await
            .unwrap();
        assert!(dest.join("README.md").exists());

        client.pull(&dest).await.unwrap();
        client.pull(&dest).await.unwrap();

        let head = client.head_commit(&dest).await.unwrap();
        assert_eq!(head.len(), 40);
    }

    #[tokio::test]
    async fn pull_outside_repository_fails() {
        let scratch = tempfile::tempdir().unwrap();
        let client = GitCli::new(Duration::from_secs(30));
        let err = client.pull(scratch.path()).await.unwrap_err();
        assert!(
            matches!(
                err,
                CommonError::GitFailed { .. } | CommonError::GitSpawn(_)
            ),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn pull_through_hanging_transport_times_out() {
        let repo = tempfile::tempdir().unwrap();
        let dir = repo.path();
        // The `ext` transport runs `sh -c "sleep 30"` in place of a remote helper.
        let configured = git(dir, &["init", "-q"])
            && git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"])
            && git(dir, &["config", "protocol.ext.allow", "always"])
            && git(dir, &["remote", "add", "origin", "ext::sh -c sleep% 30"])
            && git(dir, &["config", "branch.main.remote", "origin"])
            && git(dir, &["config", "branch.main.merge", "refs/heads/main"]);
        if !configured {
            eprintln!("git not available, skipping");
            return;
        }

        let client = GitCli::new(Duration::from_secs(2));
        let started = std::time::Instant::now();
        let err = client.pull(dir).await.unwrap_err();

        assert!(
            matches!(
                &err,
                CommonError::GitTimeout { command, timeout }
                    if command == "pull" && *timeout == Duration::from_secs(2)
            ),
            "unexpected error: {err}"
        );
        assert!(err.to_string().contains("timed out after 2s"), "{err}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
