//! # Server Configuration
//!
//! Configuration for the HTTP server: bind address, presentation mode, JWT
//! settings and CORS origins. Environment overrides are applied exactly once
//! at boot via [`ServerConfig::apply_env`]; nothing reads the process
//! environment after that.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::JwtConfig;
use crate::error::Mode;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Presentation mode for failure responses (default: production)
    #[serde(default)]
    pub mode: Mode,

    /// Secret for signing access tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Access token lifetime in hours (default: 24)
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// CORS allowed origins (empty = permissive, for development)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_jwt_secret() -> String {
    "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mode: Mode::default(),
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Applies process environment overrides, once, at boot.
    pub fn apply_env(mut self) -> Self {
        if let Some(port) = std::env::var("TOURBASE_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            self.port = port;
        }
        match std::env::var("TOURBASE_MODE").as_deref() {
            Ok("development") => self.mode = Mode::Development,
            Ok("production") => self.mode = Mode::Production,
            _ => {}
        }
        if let Ok(secret) = std::env::var("TOURBASE_JWT_SECRET") {
            self.jwt_secret = secret;
        }
        self
    }

    /// Token settings derived from this configuration.
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            ttl: Duration::hours(self.token_ttl_hours),
            issuer: "tourbase".to_string(),
        }
    }
}
