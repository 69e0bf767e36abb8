// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

/// Default points awarded for each accepted completion.
pub const DEFAULT_POINTS_PER_COMPLETION: u32 = 10;

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL_DAYS: u32 = 7;

/// Completion photos arrive inline as data URLs, so bodies can be large.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Which persistence backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process maps; data is lost on restart.
    Memory,
    /// Google Cloud Firestore (or the emulator).
    Firestore,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "firestore" => Ok(StorageBackend::Firestore),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Persistence backend
    pub storage: StorageBackend,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Session token lifetime in days
    pub token_ttl_days: u32,
    /// Points credited per completion
    pub points_per_completion: u32,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
    /// Insert the sample challenges at startup when none exist
    pub seed_sample_challenges: bool,
}

impl Config {
    /// Config for tests: in-memory storage and a fixed signing key.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            points_per_completion: DEFAULT_POINTS_PER_COMPLETION,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            seed_sample_challenges: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Memory,
        };

        let gcp_project_id = match storage {
            StorageBackend::Firestore => {
                env::var("GCP_PROJECT_ID").map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?
            }
            StorageBackend::Memory => {
                env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string())
            }
        };

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .trim()
            .to_string()
            .into_bytes();
        if jwt_signing_key.len() < 32 {
            return Err(ConfigError::Invalid(
                "JWT_SIGNING_KEY",
                "must be at least 32 bytes".to_string(),
            ));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id,
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            storage,
            jwt_signing_key,
            token_ttl_days: parse_or("TOKEN_TTL_DAYS", DEFAULT_TOKEN_TTL_DAYS)?,
            points_per_completion: parse_or(
                "POINTS_PER_COMPLETION",
                DEFAULT_POINTS_PER_COMPLETION,
            )?,
            max_body_bytes: parse_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            seed_sample_challenges: parse_or("SEED_SAMPLE_CHALLENGES", true)?,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
