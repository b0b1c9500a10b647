//! # Request Guards
//!
//! Bearer-token authentication and role checks used by protected routes.

use axum::http::HeaderMap;
use serde_json::Value;

use crate::error::AppError;
use crate::models::changed_password_after;

use super::state::AppState;

/// Resolves the bearer token to a stored user document.
///
/// Fails operationally when the header is missing, the token does not
/// verify, the user no longer exists, or the password changed after the
/// token was issued.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Value, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::unauthorized("You are not logged in. Please log in to get access")
        })?;

    let claims = state.jwt.verify(token)?;

    let user = state
        .users
        .get(&claims.sub)
        .map_err(|_| AppError::unauthorized("The user belonging to this token no longer exists"))?;

    if changed_password_after(&user, claims.iat) {
        return Err(AppError::unauthorized(
            "Password was changed recently. Please log in again",
        ));
    }

    Ok(user)
}

/// Allows only the listed roles through.
pub fn require_role(user: &Value, allowed: &[&str]) -> Result<(), AppError> {
    let role = user.get("role").and_then(Value::as_str).unwrap_or("user");
    if allowed.contains(&role) {
        return Ok(());
    }
    Err(AppError::forbidden(
        "You do not have permission to perform this action",
    ))
}
