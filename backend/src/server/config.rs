//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SYNAPSE_*` environment variables and
//! configuration files, in that order of precedence. Every field is optional;
//! accessors supply the defaults.

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_MAX_UPLOAD_BYTES;
use crate::outbound::security::DEFAULT_BCRYPT_COST;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Configuration values for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SYNAPSE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. In-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Directory holding uploaded documents.
    pub upload_dir: Option<PathBuf>,
    /// Origin allowed by the CORS layer.
    pub frontend_url: Option<String>,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: Option<u64>,
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: Option<u32>,
    /// File holding the token signing secret.
    pub jwt_secret_file: Option<PathBuf>,
}

impl ServerSettings {
    /// Listen address, defaulting to `0.0.0.0:5000`.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Upload directory, defaulting to `uploads` under the working directory.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// CORS origin, defaulting to the local frontend dev server.
    pub fn frontend_url(&self) -> &str {
        self.frontend_url.as_deref().unwrap_or(DEFAULT_FRONTEND_URL)
    }

    /// Upload ceiling, defaulting to 10 MiB.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// bcrypt cost clamped to the range the algorithm accepts.
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
            .unwrap_or(DEFAULT_BCRYPT_COST)
            .clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST)
    }

    /// Path of the signing secret file, if configured.
    pub fn jwt_secret_file(&self) -> Option<&Path> {
        self.jwt_secret_file.as_deref()
    }
}
