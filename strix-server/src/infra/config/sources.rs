use serde::Deserialize;
use std::path::PathBuf;

use strix_core::scan::ScannerConfig;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    pub scanner: Option<ScannerConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileDatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileAuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: Option<i64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileCorsConfig {
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment overrides, gathered once at load time.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var_os("STRIX_CONFIG").map(PathBuf::from),
            database_url: non_empty_var("DATABASE_URL"),
            jwt_secret: non_empty_var("STRIX_JWT_SECRET"),
            host: non_empty_var("SERVER_HOST"),
            port: non_empty_var("SERVER_PORT").and_then(|raw| raw.parse().ok()),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
