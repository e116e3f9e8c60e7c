//! Runtime configuration, read once from the environment at startup.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port the backend listens on
    pub port: u16,
    /// Bind address for the listener
    pub bind: String,
    /// Directory with the built dashboard assets
    pub dashboard_dist: String,
    /// Browser origins allowed to call the API
    pub cors_origins: Vec<String>,
    /// Page size for trace listings when the request does not pass one
    pub default_page_size: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_parse("TRACEBOARD_PORT", 8090)?,
            bind: env_str("TRACEBOARD_BIND", "0.0.0.0"),
            dashboard_dist: dashboard_dist_from_env(),
            cors_origins: env_csv(
                "TRACEBOARD_CORS_ORIGINS",
                &["http://localhost:8080", "http://127.0.0.1:8080"],
            ),
            default_page_size: env_parse("TRACEBOARD_DEFAULT_PAGE_SIZE", 50)?,
        })
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

fn env_csv(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Err(_) => default.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Resolve the dashboard dist directory.
///
/// If `TRACEBOARD_DIST` is set, that value is used as-is. Otherwise
/// resolve from the workspace root so this works whether the server
/// is launched from the repository root or from `traceboard-server/`.
pub fn dashboard_dist_from_env() -> String {
    if let Ok(path) = std::env::var("TRACEBOARD_DIST") {
        return path;
    }

    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    workspace_root
        .join("traceboard-ui/target/dx/traceboard-ui/debug/web/public")
        .to_string_lossy()
        .to_string()
}
