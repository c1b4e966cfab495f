use std::path::PathBuf;

use thiserror::Error;

use super::sources::{EnvConfig, FileConfig};
use super::{AuthConfig, Config, CorsConfig, DatabaseConfig, ServerConfig};

const DEFAULT_CONFIG_LOCATIONS: &[&str] = &["strix.toml", "config/strix.toml"];

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("configuration file not found: {path}")]
    MissingConfig { path: PathBuf },
}

/// Loads configuration from an optional TOML file with environment
/// overrides on top. Precedence, lowest to highest: built-in defaults,
/// file values, environment variables.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<Config, ConfigLoadError> {
        // A missing .env file is fine; other dotenv failures are not worth
        // aborting startup over either, the variables just stay unset.
        let _ = dotenvy::dotenv();

        let env = EnvConfig::gather();
        let file = self.load_file_config(&env)?.unwrap_or_default();
        Ok(compose(file, env))
    }

    fn load_file_config(&self, env: &EnvConfig) -> Result<Option<FileConfig>, ConfigLoadError> {
        let explicit = self.config_path.clone().or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => {
                let Some(found) = DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .map(PathBuf::from)
                    .find(|candidate| candidate.exists())
                else {
                    return Ok(None);
                };
                found
            }
        };

        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigLoadError::Read {
            path: path.clone(),
            source,
        })?;
        let parsed =
            toml::from_str(&raw).map_err(|source| ConfigLoadError::Parse { path, source })?;
        Ok(Some(parsed))
    }
}

fn compose(file: FileConfig, env: EnvConfig) -> Config {
    let defaults = Config::default();

    Config {
        server: ServerConfig {
            host: env
                .host
                .or(file.server.host)
                .unwrap_or(defaults.server.host),
            port: env
                .port
                .or(file.server.port)
                .unwrap_or(defaults.server.port),
        },
        database: DatabaseConfig {
            url: env.database_url.or(file.database.url),
        },
        auth: AuthConfig {
            jwt_secret: env
                .jwt_secret
                .or(file.auth.jwt_secret)
                .unwrap_or(defaults.auth.jwt_secret),
            token_ttl_secs: file
                .auth
                .token_ttl_secs
                .unwrap_or(defaults.auth.token_ttl_secs),
        },
        cors: CorsConfig {
            allowed_origins: file.cors.allowed_origins.unwrap_or_default(),
        },
        scanner: file.scanner.unwrap_or(defaults.scanner),
    }
}
