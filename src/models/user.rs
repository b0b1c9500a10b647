//! # User Declarations
//!
//! The user document and its rules: email format and uniqueness, role
//! membership, password length plus confirmation, and the password
//! lifecycle fields (change timestamp, reset token hash and expiry, active
//! flag). Passwords arrive plain in the signup payload and are stored only
//! as hashes; the `password_confirm` field is never persisted.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

/// Accepted user roles.
pub const ROLES: [&str; 4] = ["user", "guide", "lead-guide", "admin"];

/// Shortest accepted password.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// How long a password reset token stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// Incoming signup payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

impl SignupDraft {
    /// Validates the payload, collecting every violation.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut messages = Vec::new();

        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            messages.push("Please tell us your name".to_string());
        }
        match self.email.as_deref() {
            None => messages.push("Please provide your email".to_string()),
            Some(email) if !is_valid_email(email) => {
                messages.push("Please provide a valid email".to_string());
            }
            Some(_) => {}
        }
        if let Some(role) = self.role.as_deref() {
            if !ROLES.contains(&role) {
                messages.push(format!("Role is either: {}", ROLES.join(", ")));
            }
        }
        match self.password.as_deref() {
            None => messages.push("Please provide a password".to_string()),
            Some(password) => password_rule(password, &mut messages),
        }
        if self.password_confirm.as_deref() != self.password.as_deref() {
            messages.push("Passwords are not the same".to_string());
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages)
        }
    }

    /// Builds the stored document; the password arrives pre-hashed.
    ///
    /// Call only after [`SignupDraft::validate`] has passed.
    pub fn into_document(self, password_hash: String) -> Value {
        json!({
            "name": self.name,
            "email": self.email.map(|email| email.to_lowercase()),
            "photo": self.photo,
            "role": self.role.unwrap_or_else(|| "user".to_string()),
            "password": password_hash,
            "password_changed_at": Value::Null,
            "password_reset_token": Value::Null,
            "password_reset_expires": Value::Null,
            "active": true,
            "created_at": Utc::now(),
        })
    }
}

/// Incoming login payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Checks password rules shared by signup and reset.
pub fn password_rule(password: &str, messages: &mut Vec<String>) {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        messages.push(format!(
            "A password must have at least {PASSWORD_MIN_CHARS} characters"
        ));
    }
}

/// Whether a stored user changed their password after a token was issued.
///
/// Users without a `password_changed_at` timestamp have never changed it.
pub fn changed_password_after(user: &Value, token_issued_at: i64) -> bool {
    user.get("password_changed_at")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|changed| token_issued_at < changed.timestamp())
        .unwrap_or(false)
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
        })
        .is_match(email)
}
