//! # User Routes
//!
//! Signup, login, password reset and user reads. Credential checks always
//! go through the raw document (the hidden password hash); everything sent
//! back to a client goes through concealed reads or the query pipeline.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{crypto, AuthError};
use crate::error::AppError;
use crate::models::user::{password_rule, RESET_TOKEN_TTL_MINUTES};
use crate::models::{LoginRequest, SignupDraft};
use crate::observability::Logger;
use crate::query::{Predicate, QueryFeatures, Queryable, RawQuery};

use super::guard::authenticate;
use super::response::{ListResponse, MessageResponse, SingleResponse, TokenResponse};
use super::state::{AppState, SharedState};

type ErrorBody = (StatusCode, Json<Value>);

pub fn user_routes(state: SharedState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", patch(reset_password))
        .route("/me", get(me))
        .route("/", get(list_users))
        .with_state(state)
}

// ==================
// Request Types
// ==================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForgotPasswordRequest {
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResetPasswordRequest {
    password: Option<String>,
    password_confirm: Option<String>,
}

// ==================
// Handlers
// ==================

async fn signup(
    State(state): State<SharedState>,
    Json(draft): Json<SignupDraft>,
) -> Result<(StatusCode, Json<TokenResponse<Value>>), ErrorBody> {
    signup_inner(&state, draft)
        .map(|response| (StatusCode::CREATED, Json(response)))
        .map_err(|e| state.reporter.respond(&e))
}

fn signup_inner(state: &AppState, draft: SignupDraft) -> Result<TokenResponse<Value>, AppError> {
    draft
        .validate()
        .map_err(|messages| AppError::Validation { messages })?;

    let password = draft.password.clone().unwrap_or_default();
    let hash = crypto::hash_password(&password)?;
    let user = state.users.insert(draft.into_document(hash))?;

    let token = state.jwt.sign(stored_id(&user)?)?;
    Ok(TokenResponse::new(token, json!({ "user": user })))
}

async fn login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse<Value>>, ErrorBody> {
    login_inner(&state, request)
        .map(Json)
        .map_err(|e| state.reporter.respond(&e))
}

fn login_inner(state: &AppState, request: LoginRequest) -> Result<TokenResponse<Value>, AppError> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(AppError::bad_request("Please provide email and password"));
    };

    let user = state
        .users
        .find_one_by("email", &Value::String(email.to_lowercase()))?
        .ok_or(AuthError::InvalidCredentials)?;

    let hash = user.get("password").and_then(Value::as_str).unwrap_or("");
    if !crypto::verify_password(&password, hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.jwt.sign(stored_id(&user)?)?;
    Ok(TokenResponse::new(
        token,
        json!({ "user": state.users.conceal(user) }),
    ))
}

async fn forgot_password(
    State(state): State<SharedState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ErrorBody> {
    forgot_password_inner(&state, request)
        .map(Json)
        .map_err(|e| state.reporter.respond(&e))
}

fn forgot_password_inner(
    state: &AppState,
    request: ForgotPasswordRequest,
) -> Result<MessageResponse, AppError> {
    let email = request
        .email
        .ok_or_else(|| AppError::bad_request("Please provide your email"))?
        .to_lowercase();

    let user = state
        .users
        .find_one_by("email", &Value::String(email.clone()))?
        .ok_or_else(|| AppError::not_found("There is no user with that email address"))?;

    let raw_token = crypto::generate_reset_token();
    let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
    state.users.update(
        &stored_id(&user)?.to_string(),
        json!({
            "password_reset_token": crypto::hash_token(&raw_token),
            "password_reset_expires": expires,
        }),
    )?;

    // No outbound mail here: the raw token is surfaced to the operator log
    // for delivery out of band.
    Logger::info(
        "PASSWORD_RESET_TOKEN_ISSUED",
        &[("email", email.as_str()), ("token", raw_token.as_str())],
    );

    Ok(MessageResponse::new("Reset token issued"))
}

async fn reset_password(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<TokenResponse<Value>>, ErrorBody> {
    reset_password_inner(&state, &token, request)
        .map(Json)
        .map_err(|e| state.reporter.respond(&e))
}

fn reset_password_inner(
    state: &AppState,
    raw_token: &str,
    request: ResetPasswordRequest,
) -> Result<TokenResponse<Value>, AppError> {
    let candidate_hash = crypto::hash_token(raw_token);
    let user = state
        .users
        .find_one_where(|doc| {
            doc.get("password_reset_token")
                .and_then(Value::as_str)
                .map(|stored| crypto::tokens_match(stored, &candidate_hash))
                .unwrap_or(false)
        })?
        .filter(|doc| !reset_token_expired(doc))
        .ok_or_else(|| AppError::bad_request("Token is invalid or has expired"))?;

    let mut messages = Vec::new();
    match request.password.as_deref() {
        None => messages.push("Please provide a password".to_string()),
        Some(password) => password_rule(password, &mut messages),
    }
    if request.password_confirm.as_deref() != request.password.as_deref() {
        messages.push("Passwords are not the same".to_string());
    }
    if !messages.is_empty() {
        return Err(AppError::Validation { messages });
    }

    let hash = crypto::hash_password(&request.password.unwrap_or_default())?;
    let id = stored_id(&user)?;
    let updated = state.users.update(
        &id.to_string(),
        json!({
            "password": hash,
            "password_changed_at": Utc::now(),
            "password_reset_token": Value::Null,
            "password_reset_expires": Value::Null,
        }),
    )?;

    let token = state.jwt.sign(id)?;
    Ok(TokenResponse::new(token, json!({ "user": updated })))
}

async fn me(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<SingleResponse<Value>>, ErrorBody> {
    authenticate(&state, &headers)
        .map(|user| Json(SingleResponse::new(user)))
        .map_err(|e| state.reporter.respond(&e))
}

async fn list_users(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ListResponse<Value>>, ErrorBody> {
    list_users_inner(&state, &headers, params)
        .map(Json)
        .map_err(|e| state.reporter.respond(&e))
}

fn list_users_inner(
    state: &AppState,
    headers: &HeaderMap,
    params: Vec<(String, String)>,
) -> Result<ListResponse<Value>, AppError> {
    authenticate(state, headers)?;
    let raw = RawQuery::from_pairs(params);
    let base = state.users.query()?.filter(active_users());
    let docs = QueryFeatures::new(base, &raw).apply().into_query().run();
    Ok(ListResponse::new(docs))
}

// ==================
// Helpers
// ==================

fn stored_id(user: &Value) -> Result<Uuid, AppError> {
    user.get("_id")
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| AppError::internal("stored document has no usable _id"))
}

fn reset_token_expired(user: &Value) -> bool {
    user.get("password_reset_expires")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|expires| expires < Utc::now())
        .unwrap_or(true)
}

fn active_users() -> Predicate {
    let mut predicate = Predicate::new();
    predicate.insert("active".to_string(), json!({"$ne": false}));
    predicate
}
