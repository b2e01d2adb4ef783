// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::services::oauth::OAuthProvider;
use std::env;

/// Credentials for one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI registered with the provider (our callback route).
    pub callback_url: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection string (sqlite)
    pub database_url: String,
    /// Frontend URL for OAuth redirects and CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Root directory for the disk storage adapter
    pub upload_dir: String,
    /// Maximum accepted upload body size in bytes
    pub max_upload_bytes: usize,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: i64,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_secret: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,

    // --- OAuth providers (None = disabled) ---
    pub google: Option<OAuthClientConfig>,
    pub kakao: Option<OAuthClientConfig>,
    pub naver: Option<OAuthClientConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_secret = env::var("JWT_SECRET")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
            .into_bytes();
        if jwt_secret.len() < 16 {
            return Err(ConfigError::Invalid("JWT_SECRET", "must be at least 16 bytes"));
        }

        let oauth_state_key = env::var("OAUTH_STATE_KEY")
            .map(|v| v.trim().as_bytes().to_vec())
            .unwrap_or_else(|_| jwt_secret.clone());

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://runcrew.db?mode=rwc".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or("API_PORT", 8080)?,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            access_token_ttl_secs: parse_or("ACCESS_TOKEN_TTL_SECS", 24 * 60 * 60)?,
            refresh_token_ttl_secs: parse_or("REFRESH_TOKEN_TTL_SECS", 30 * 24 * 60 * 60)?,
            jwt_secret,
            oauth_state_key,
            google: oauth_from_env(OAuthProvider::Google)?,
            kakao: oauth_from_env(OAuthProvider::Kakao)?,
            naver: oauth_from_env(OAuthProvider::Naver)?,
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        let client = |name: &str| OAuthClientConfig {
            client_id: format!("test_{name}_client_id"),
            client_secret: format!("test_{name}_secret"),
            callback_url: format!("http://localhost:8080/auth/{name}/callback"),
        };

        Self {
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            upload_dir: "./uploads".to_string(),
            max_upload_bytes: 1024 * 1024,
            access_token_ttl_secs: 60 * 60,
            refresh_token_ttl_secs: 30 * 24 * 60 * 60,
            jwt_secret: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
            google: Some(client("google")),
            kakao: Some(client("kakao")),
            naver: Some(client("naver")),
        }
    }

    /// Credentials for a provider, if it is enabled.
    pub fn oauth_client(&self, provider: OAuthProvider) -> Option<&OAuthClientConfig> {
        match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Kakao => self.kakao.as_ref(),
            OAuthProvider::Naver => self.naver.as_ref(),
        }
    }
}

/// Read `{PREFIX}_CLIENT_ID`, `{PREFIX}_CLIENT_SECRET` and `{PREFIX}_CALLBACK_URL`.
///
/// A provider without a client id is disabled; a client id without the
/// other two variables is a configuration error.
fn oauth_from_env(provider: OAuthProvider) -> Result<Option<OAuthClientConfig>, ConfigError> {
    let (id_var, secret_var, callback_var) = match provider {
        OAuthProvider::Google => (
            "GOOGLE_CLIENT_ID",
            "GOOGLE_CLIENT_SECRET",
            "GOOGLE_CALLBACK_URL",
        ),
        OAuthProvider::Kakao => ("KAKAO_CLIENT_ID", "KAKAO_CLIENT_SECRET", "KAKAO_CALLBACK_URL"),
        OAuthProvider::Naver => ("NAVER_CLIENT_ID", "NAVER_CLIENT_SECRET", "NAVER_CALLBACK_URL"),
    };

    let Ok(client_id) = env::var(id_var) else {
        tracing::info!(provider = %provider, "OAuth provider not configured, disabled");
        return Ok(None);
    };

    Ok(Some(OAuthClientConfig {
        client_id: client_id.trim().to_string(),
        client_secret: env::var(secret_var)
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing(secret_var))?,
        callback_url: env::var(callback_var).map_err(|_| ConfigError::Missing(callback_var))?,
    }))
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, "not a valid number")),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
