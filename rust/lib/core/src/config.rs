use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ServiceError;

/// Header carrying the caller identity token unless configured otherwise.
pub const DEFAULT_IDENTITY_HEADER: &str = "api-key";

/// Service configuration.
///
/// Loaded from an optional TOML file, then individual fields may be
/// overridden from the command line by the server binary.
///
/// ```toml
/// data_dir = "/var/lib/chirp"
/// listen = "0.0.0.0:8080"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Root directory for persisted state.
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database file.
    /// Defaults to `{data_dir}/chirp.sqlite` if not specified.
    pub sqlite_path: Option<PathBuf>,

    /// Directory holding uploaded media files.
    /// Defaults to `{data_dir}/images/` if not specified.
    pub media_dir: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,

    /// Request header that carries the caller identity token.
    pub identity_header: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            sqlite_path: None,
            media_dir: None,
            listen: "0.0.0.0:8080".to_string(),
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file. Missing keys take defaults.
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::Validation(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ServiceError> {
        toml::from_str(content).map_err(|e| ServiceError::Validation(e.to_string()))
    }

    /// Resolve the SQLite database path, falling back to `{data_dir}/chirp.sqlite`.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("chirp.sqlite"))
    }

    /// Resolve the media directory, falling back to `{data_dir}/images`.
    pub fn resolve_media_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("images"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from("db").join(name))
    }
}
