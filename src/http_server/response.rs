//! # Response Envelopes
//!
//! Success envelopes shared by every route.

use serde::Serialize;

/// List envelope: `{status, results, data}`
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub status: &'static str,
    pub results: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        let results = data.len();
        Self {
            status: "success",
            results,
            data,
        }
    }
}

/// Single record envelope: `{status, data}`
#[derive(Debug, Clone, Serialize)]
pub struct SingleResponse<T: Serialize> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> SingleResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// Envelope for issued credentials: `{status, token, data}`
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse<T: Serialize> {
    pub status: &'static str,
    pub token: String,
    pub data: T,
}

impl<T: Serialize> TokenResponse<T> {
    pub fn new(token: String, data: T) -> Self {
        Self {
            status: "success",
            token,
            data,
        }
    }
}

/// Message-only envelope: `{status, message}`
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}
