use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/app.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Directory holding the JSON entity/edge tables.
    pub working_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

pub async fn load_config() -> Result<AppConfig> {
    let path = config_path();
    let contents = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: AppConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    info!(path = %path.display(), "Configuration loaded from disk");
    Ok(config)
}

fn config_path() -> PathBuf {
    env::var("APP_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
