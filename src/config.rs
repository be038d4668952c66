use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_API_URL: &str = "http://localhost:10000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
pub const DEFAULT_STORAGE_PATH: &str = "reelscout_storage.json";

/// Runtime settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend collaborator base URL, without trailing slash.
    pub api_base_url: String,
    pub bind_addr: SocketAddr,
    /// Origin the TMDB authorization page redirects back to.
    pub public_url: String,
    pub storage_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = normalize_origin(
            &read("MOVIEDB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )
        .context("MOVIEDB_API_URL is invalid")?;
        let bind_raw = read("REELSCOUT_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .with_context(|| format!("REELSCOUT_ADDR is not a socket address: {bind_raw}"))?;
        let public_url = normalize_origin(
            &read("REELSCOUT_PUBLIC_URL").unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
        )
        .context("REELSCOUT_PUBLIC_URL is invalid")?;
        let storage_path = PathBuf::from(
            read("REELSCOUT_STORAGE").unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string()),
        );

        Ok(Self {
            api_base_url,
            bind_addr,
            public_url,
            storage_path,
        })
    }

    pub fn log_summary(&self) {
        info!("Backend API: {}", self.api_base_url);
        info!("Public URL: {}", self.public_url);
        info!("Storage file: {}", self.storage_path.display());
    }
}

fn normalize_origin(raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(anyhow!("expected an http(s) URL, got '{}'", raw));
    }
    Ok(trimmed.to_string())
}
