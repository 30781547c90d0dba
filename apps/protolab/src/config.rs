//! # Configuration
//!
//! Settings come from four places, highest priority first:
//!
//! 1. Command-line flags
//! 2. Environment variables (`PROTOLAB_*`)
//! 3. The TOML config file (`protolab.toml` by default, optional)
//! 4. Built-in defaults
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [storage]
//! database = "protolab.redb"
//! backend = "redb"        # or "memory"
//!
//! [security]
//! cors_origins = "http://localhost:5173"
//! rate_limit = 100        # requests/second, 0 disables
//! api_key = "secret"
//!
//! [log]
//! format = "json"         # or "text"
//! ```

use protolab_core::ProtolabError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// ENVIRONMENT VARIABLES & DEFAULTS
// =============================================================================

pub const ENV_CORS_ORIGINS: &str = "PROTOLAB_CORS_ORIGINS";
pub const ENV_RATE_LIMIT: &str = "PROTOLAB_RATE_LIMIT";
pub const ENV_API_KEY: &str = "PROTOLAB_API_KEY";
pub const ENV_LOG_FORMAT: &str = "PROTOLAB_LOG_FORMAT";

pub const DEFAULT_CONFIG_FILE: &str = "protolab.toml";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "protolab.redb";
pub const DEFAULT_RATE_LIMIT: u32 = 100;

// =============================================================================
// CONFIG FILE
// =============================================================================

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
    pub security: SecuritySection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub database: Option<PathBuf>,
    pub backend: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecuritySection {
    pub cors_origins: Option<String>,
    pub rate_limit: Option<u32>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    pub format: Option<String>,
}

impl FileConfig {
    /// Load the config file, or the empty config if it does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ProtolabError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProtolabError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::parse(&contents).map_err(|e| match e {
            ProtolabError::DeserializationError(msg) => ProtolabError::DeserializationError(
                format!("Invalid config '{}': {}", path.display(), msg),
            ),
            other => other,
        })
    }

    /// Parse config file contents.
    pub fn parse(contents: &str) -> Result<Self, ProtolabError> {
        toml::from_str(contents).map_err(|e| ProtolabError::DeserializationError(e.to_string()))
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Which store backs the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// redb database on disk.
    #[default]
    Redb,
    /// Volatile in-memory maps.
    Memory,
}

impl Backend {
    pub fn parse(s: &str) -> Result<Self, ProtolabError> {
        match s {
            "redb" => Ok(Self::Redb),
            "memory" => Ok(Self::Memory),
            _ => Err(ProtolabError::invalid(
                "backend",
                "Backend must be one of redb, memory",
            )),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::Memory => "memory",
        }
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Resolve from `PROTOLAB_LOG_FORMAT`, then the config file.
    ///
    /// Anything other than `json` means text.
    #[must_use]
    pub fn resolve(file: &LogSection) -> Self {
        let value = std::env::var(ENV_LOG_FORMAT).ok().or_else(|| file.format.clone());
        match value.as_deref() {
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Security knobs for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Comma-separated origins, `*` for any, `None` for localhost only.
    pub cors_origins: Option<String>,
    /// Requests per second across all clients. 0 disables limiting.
    pub rate_limit: u32,
    /// Bearer token required on every route but `/health`.
    pub api_key: Option<String>,
}

impl SecurityConfig {
    /// Environment variables over the config file over defaults.
    #[must_use]
    pub fn resolve(file: &SecuritySection) -> Self {
        let cors_origins = non_empty_env(ENV_CORS_ORIGINS).or_else(|| file.cors_origins.clone());
        let rate_limit = non_empty_env(ENV_RATE_LIMIT)
            .and_then(|s| match s.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid {}: {}", ENV_RATE_LIMIT, s);
                    None
                }
            })
            .or(file.rate_limit)
            .unwrap_or(DEFAULT_RATE_LIMIT);
        let api_key = non_empty_env(ENV_API_KEY)
            .or_else(|| file.api_key.clone().filter(|k| !k.is_empty()));

        Self {
            cors_origins,
            rate_limit,
            api_key,
        }
    }
}

/// Storage location after merging flags, file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub database: PathBuf,
    pub backend: Backend,
}

impl StorageConfig {
    pub fn resolve(
        database: Option<PathBuf>,
        backend: Option<&str>,
        file: &StorageSection,
    ) -> Result<Self, ProtolabError> {
        let database = database
            .or_else(|| file.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
        let backend = match backend.or(file.backend.as_deref()) {
            Some(name) => Backend::parse(name)?,
            None => Backend::default(),
        };
        Ok(Self { database, backend })
    }
}

/// Bind address after merging flags, file and defaults.
#[must_use]
pub fn resolve_bind(host: Option<String>, port: Option<u16>, file: &ServerSection) -> String {
    let host = host
        .or_else(|| file.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = port.or(file.port).unwrap_or(DEFAULT_PORT);
    format!("{}:{}", host, port)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

// =============================================================================
// TESTS
// =============================================================================
