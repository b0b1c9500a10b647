//! # Error Reporter
//!
//! Terminal rendering of failures into HTTP responses. The reporter is
//! constructed once at boot with an explicit presentation mode; it never
//! fails and is never retried. Each call corresponds to exactly one
//! already-failed request.

use std::backtrace::Backtrace;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::observability::Logger;

use super::{normalize, AppError, Mode};

#[derive(Debug, Clone, Copy)]
pub struct ErrorReporter {
    mode: Mode,
}

impl ErrorReporter {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Builds the response for a failed request.
    ///
    /// Development mode exposes the full failure plus a captured backtrace.
    /// Production mode describes operational failures verbatim and reduces
    /// everything else to a fixed message, logging the detail server-side.
    pub fn respond(&self, err: &AppError) -> (StatusCode, Json<Value>) {
        let normalized = normalize(err);
        let status = StatusCode::from_u16(normalized.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match self.mode {
            Mode::Development => json!({
                "status": normalized.status,
                "error": format!("{err:?}"),
                "message": normalized.message,
                "stack": Backtrace::force_capture().to_string(),
            }),
            Mode::Production if normalized.is_operational => json!({
                "status": normalized.status,
                "message": normalized.message,
            }),
            Mode::Production => {
                let detail = format!("{err:?}");
                Logger::error(
                    "UNHANDLED_ERROR",
                    &[("detail", detail.as_str()), ("kind", normalized.original_kind)],
                );
                json!({
                    "status": "error",
                    "message": "Something went wrong!",
                })
            }
        };

        (status, Json(body))
    }
}
