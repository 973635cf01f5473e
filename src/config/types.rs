// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Serve more than one request per connection
    pub keep_alive: bool,
    /// Seconds allowed for each request head, idle keep-alive wait included
    pub read_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Which object store the server reads from
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Objects are files below `storage.root`
    Local,
    /// Objects are fetched from a public bucket origin at `storage.endpoint`
    Http,
}

/// Object storage configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Bucket directory for the `local` backend
    pub root: String,
    /// Origin base URL for the `http` backend, e.g. `http://bucket.internal:9000/resumes`
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Read-through disk cache directory (disabled if not set)
    #[serde(default)]
    pub cache_dir: Option<String>,
}
