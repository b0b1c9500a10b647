//! # Error Normalization
//!
//! Every failure in request handling funnels into [`AppError`], a closed set
//! of variants produced by the collaborating modules at their boundaries.
//! [`normalize`] rewrites a variant into the uniform shape a response is
//! built from, and [`ErrorReporter`] renders it under the configured
//! presentation mode.

pub mod reporter;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

pub use reporter::ErrorReporter;

/// Presentation mode for failure responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Verbose diagnostics for operators.
    Development,
    /// Minimal, safe client-facing output.
    #[default]
    Production,
}

/// Application-level failure, classified at the raising module's boundary.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// A client-supplied value failed to parse as its target type.
    #[error("Invalid {path}: {value}.")]
    Cast { path: String, value: String },

    /// A unique-field constraint was violated.
    #[error("Duplicate field value: {value}. Please use another value.")]
    DuplicateField { value: String },

    /// One or more declared validation rules failed.
    #[error("Invalid input data. {}", .messages.join(". "))]
    Validation { messages: Vec<String> },

    /// The bearer token failed verification.
    #[error("Invalid token. Please log in again.")]
    MalformedToken,

    /// The bearer token is past its expiry.
    #[error("Your token has expired. Please log in again.")]
    TokenExpired,

    /// A handler-raised failure that is safe to describe to the client.
    #[error("{message}")]
    Operational { status_code: u16, message: String },

    /// Anything unrecognized: a programming or subsystem failure.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Operational {
            status_code: 404,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Operational {
            status_code: 400,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Operational {
            status_code: 401,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Operational {
            status_code: 403,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Cast { .. } | Self::DuplicateField { .. } | Self::Validation { .. } => 400,
            Self::MalformedToken | Self::TokenExpired => 401,
            Self::Operational { status_code, .. } => *status_code,
            Self::Internal(_) => 500,
        }
    }

    /// Whether this failure is safe to describe verbatim to the client.
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Stable tag naming the originating kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cast { .. } => "cast",
            Self::DuplicateField { .. } => "duplicate_field",
            Self::Validation { .. } => "validation",
            Self::MalformedToken => "malformed_token",
            Self::TokenExpired => "token_expired",
            Self::Operational { .. } => "operational",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cast { path, value } => Self::Cast { path, value },
            StoreError::Duplicate { value, .. } => Self::DuplicateField { value },
            StoreError::Validation { messages } => Self::Validation { messages },
            StoreError::NotFound { entity } => {
                Self::not_found(format!("No {entity} found with that ID"))
            }
            StoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MalformedToken => Self::MalformedToken,
            AuthError::TokenExpired => Self::TokenExpired,
            AuthError::InvalidCredentials => Self::unauthorized("Incorrect email or password"),
            AuthError::HashingFailed | AuthError::TokenGenerationFailed => {
                Self::Internal(err.to_string())
            }
        }
    }
}

/// `fail` for client-caused status codes, `error` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatus {
    Fail,
    Error,
}

impl ErrorStatus {
    pub fn from_status_code(code: u16) -> Self {
        if (400..500).contains(&code) {
            Self::Fail
        } else {
            Self::Error
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

/// Uniform failure shape every response is derived from.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedError {
    pub status_code: u16,
    pub status: ErrorStatus,
    pub message: String,
    pub is_operational: bool,
    pub original_kind: &'static str,
}

/// Rewrites a classified failure into its normalized form.
///
/// The match is exhaustive over the closed variant set; no field sniffing.
pub fn normalize(err: &AppError) -> NormalizedError {
    let status_code = err.status_code();
    NormalizedError {
        status_code,
        status: ErrorStatus::from_status_code(status_code),
        message: err.to_string(),
        is_operational: err.is_operational(),
        original_kind: err.kind(),
    }
}
