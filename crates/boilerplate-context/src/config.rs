use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::model::Platform;

const DEFAULT_SUBDIR: &str = "boilerplates";
const DEFAULT_GUIDELINE_FILE: &str = "AGENTS.md";
const DEFAULT_GIT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 3000;

/// Application configuration loaded explicitly from environment variables.
///
/// The repository URL and clone directory have no defaults; everything else does.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote repository to mirror.
    pub repo_url: String,
    /// Local directory holding the working copy.
    pub repo_dir: PathBuf,
    /// Directory inside the working copy that contains one subtree per platform.
    pub subdir: String,
    /// Guideline filename inside each platform subtree.
    pub guideline_file: String,
    /// Configured platforms, in the order they are listed and concatenated.
    pub platforms: Vec<Platform>,
    /// Upper bound for a single git clone or pull.
    pub git_timeout: Duration,
    /// Skip pulls younger than this. Zero pulls on every refresh.
    pub refresh_interval: Duration,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `BOILERPLATE_REPO_URL`: remote repository URL
    /// - `BOILERPLATE_REPO_DIR`: local clone directory
    ///
    /// Optional:
    /// - `BOILERPLATE_SUBDIR` (default: "boilerplates")
    /// - `BOILERPLATE_GUIDELINE_FILE` (default: "AGENTS.md")
    /// - `BOILERPLATE_PLATFORMS` (default: "backend,frontend,mobile")
    /// - `GIT_TIMEOUT_SECS` (default: 30)
    /// - `REFRESH_INTERVAL_SECS` (default: 0)
    /// - `BIND_ADDR` (default: "0.0.0.0"), `PORT` (default: 3000)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} environment variable is required")))
        };

        let repo_url = required("BOILERPLATE_REPO_URL")?;
        let repo_dir = PathBuf::from(required("BOILERPLATE_REPO_DIR")?);

        let subdir = lookup("BOILERPLATE_SUBDIR").unwrap_or_else(|| DEFAULT_SUBDIR.to_string());
        let guideline_file = lookup("BOILERPLATE_GUIDELINE_FILE")
            .unwrap_or_else(|| DEFAULT_GUIDELINE_FILE.to_string());

        let platforms = match lookup("BOILERPLATE_PLATFORMS") {
            Some(raw) => parse_platforms(&raw)?,
            None => Platform::ALL.to_vec(),
        };

        let git_timeout_secs = parse_number("GIT_TIMEOUT_SECS", &lookup, DEFAULT_GIT_TIMEOUT_SECS)?;
        if git_timeout_secs == 0 {
            return Err(AppError::Config(
                "GIT_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        let refresh_interval_secs = parse_number("REFRESH_INTERVAL_SECS", &lookup, 0)?;

        let port = parse_number("PORT", &lookup, DEFAULT_PORT)?;
        let ip: IpAddr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("invalid BIND_ADDR '{raw}': {e}")))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        Ok(Self {
            repo_url,
            repo_dir,
            subdir,
            guideline_file,
            platforms,
            git_timeout: Duration::from_secs(git_timeout_secs),
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            bind_addr: SocketAddr::new(ip, port),
        })
    }
}

fn parse_platforms(raw: &str) -> Result<Vec<Platform>, AppError> {
    let mut platforms = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let platform: Platform = name
            .parse()
            .map_err(|e| AppError::Config(format!("BOILERPLATE_PLATFORMS: {e}")))?;
        if platforms.contains(&platform) {
            return Err(AppError::Config(format!(
                "BOILERPLATE_PLATFORMS lists '{platform}' more than once"
            )));
        }
        platforms.push(platform);
    }
    if platforms.is_empty() {
        return Err(AppError::Config(
            "BOILERPLATE_PLATFORMS must name at least one platform".to_string(),
        ));
    }
    Ok(platforms)
}

fn parse_number<T>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {key} '{raw}': {e}"))),
        None => Ok(default),
    }
}
