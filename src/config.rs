//! Server configuration

use std::env;
use std::path::PathBuf;

/// Runtime configuration for the Pagesmith server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Maximum accepted request body size in bytes (default: 50MB)
    pub max_upload_bytes: usize,
    /// Rasterizer binary invoked for PDF-to-image conversion
    pub pdftoppm_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_bytes: 50 * 1024 * 1024, // 50MB
            pdftoppm_path: PathBuf::from("pdftoppm"),
        }
    }
}

impl ServerConfig {
    /// Build a config from environment variables, falling back to the
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("PAGESMITH_HOST").unwrap_or(defaults.host),
            port: env::var("PAGESMITH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            max_upload_bytes: env::var("PAGESMITH_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            pdftoppm_path: env::var("PAGESMITH_PDFTOPPM")
                .map(PathBuf::from)
                .unwrap_or(defaults.pdftoppm_path),
        }
    }
}
