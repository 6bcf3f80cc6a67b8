//! Service configuration and upload staging directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;
/// Per-file upload limit in MiB.
pub const DEFAULT_MAX_FILE_MB: u64 = 50;
/// Whole-request body limit in MiB.
pub const DEFAULT_MAX_REQUEST_MB: u64 = 256;

const MIB: u64 = 1024 * 1024;

/// Top-level PolicySage configuration. Read-only after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server port.
    pub port: u16,
    /// Directory where uploaded documents are staged during a request.
    pub upload_dir: PathBuf,
    /// Maximum size of a single uploaded file, in bytes.
    pub max_file_bytes: u64,
    /// Maximum size of a whole request body, in bytes.
    pub max_request_bytes: u64,
}

impl ServiceConfig {
    /// Create a configuration with default limits staging into `upload_dir`.
    /// Creates the directory if needed.
    pub fn new(upload_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let upload_dir = upload_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self {
            port: DEFAULT_PORT,
            upload_dir,
            max_file_bytes: DEFAULT_MAX_FILE_MB * MIB,
            max_request_bytes: DEFAULT_MAX_REQUEST_MB * MIB,
        })
    }

    /// Create configuration from environment and defaults.
    pub fn from_env() -> std::io::Result<Self> {
        let upload_dir = std::env::var("POLICYSAGE_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("policysage-uploads"));

        let mut config = Self::new(upload_dir)?;
        config.port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        config.max_file_bytes = env_mb("POLICYSAGE_MAX_FILE_MB", DEFAULT_MAX_FILE_MB) * MIB;
        config.max_request_bytes =
            env_mb("POLICYSAGE_MAX_REQUEST_MB", DEFAULT_MAX_REQUEST_MB) * MIB;

        if config.max_request_bytes < config.max_file_bytes {
            tracing::warn!(
                "Request limit ({} bytes) is below the per-file limit ({} bytes)",
                config.max_request_bytes,
                config.max_file_bytes
            );
        }

        Ok(config)
    }
}

fn env_mb(key: &str, default: u64) -> u64 {
    parse_mb(std::env::var(key).ok().as_deref()).unwrap_or(default)
}

fn parse_mb(value: Option<&str>) -> Option<u64> {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|mb| *mb > 0)
}
