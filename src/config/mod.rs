// Configuration module entry point
// Loads config.toml layered under CDN_* environment variables

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{BackendKind, Config, StorageConfig};

/// Default config file, resolved by `config::File::with_name` (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `CDN_SECTION__KEY` overrides `section.key`
fn environment() -> config::Environment {
    config::Environment::with_prefix("CDN")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, environment())
    }

    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8787)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("storage.backend", "local")?
            .set_default("storage.root", "bucket")?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that deserialize fine but cannot be served
    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == BackendKind::Http && self.storage.endpoint.is_none() {
            return Err(ConfigError::Invalid(
                "storage.endpoint is required for the http backend".to_string(),
            ));
        }
        if !matches!(
            self.logging.level.as_str(),
            "error" | "warn" | "info" | "debug"
        ) {
            return Err(ConfigError::Invalid(format!(
                "unknown logging.level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
