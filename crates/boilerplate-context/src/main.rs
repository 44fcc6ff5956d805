mod cache;
mod config;
mod content;
mod error;
mod model;
mod search;
mod server;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cache::RepoCache;
use config::Config;
use mcp_common::git::GitCli;
use server::BoilerplateContextServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting boilerplate-context MCP server");

    // 1. Load config from environment
    let config = Config::from_env().inspect_err(|e| error!(error = %e, "invalid configuration"))?;
    info!(
        repo_url = %config.repo_url,
        repo_dir = %config.repo_dir.display(),
        platforms = ?config.platforms,
        git_timeout_secs = config.git_timeout.as_secs(),
        "configuration loaded"
    );

    // 2. Clone or refresh the working copy before accepting requests
    let git = Arc::new(GitCli::new(config.git_timeout));
    let cache = Arc::new(RepoCache::new(&config, git));
    let refresh = cache
        .ensure()
        .await
        .inspect_err(|e| error!(error = %e, "initial repository sync failed"))?;
    match cache.head_commit().await {
        Ok(commit) => info!(?refresh, commit = %commit, dir = %cache.dir().display(), "working copy ready"),
        Err(e) => warn!(?refresh, error = %e, "working copy ready, HEAD unknown"),
    }

    // 3. Serve MCP over streamable HTTP
    let server = BoilerplateContextServer::new(&config, cache);
    let router = mcp_common::http::router("boilerplate-context", server);
    mcp_common::http::serve(config.bind_addr, router).await?;
    Ok(())
}
