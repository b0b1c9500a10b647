//! # Tour Routes
//!
//! CRUD over the tours collection. Listing runs the full query pipeline
//! (filter, sort, field selection, pagination) over a snapshot query with
//! secret tours pre-excluded.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::TourDraft;
use crate::query::{Predicate, QueryFeatures, Queryable, RawQuery};

use super::guard::{authenticate, require_role};
use super::response::{ListResponse, SingleResponse};
use super::state::{AppState, SharedState};

type ErrorBody = (StatusCode, Json<Value>);

pub fn tour_routes(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list_tours).post(create_tour))
        .route(
            "/:id",
            get(get_tour).patch(update_tour).delete(delete_tour),
        )
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn list_tours(
    State(state): State<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ListResponse<Value>>, ErrorBody> {
    list_tours_inner(&state, params)
        .map(Json)
        .map_err(|e| state.reporter.respond(&e))
}

fn list_tours_inner(
    state: &AppState,
    params: Vec<(String, String)>,
) -> Result<ListResponse<Value>, AppError> {
    let raw = RawQuery::from_pairs(params);
    let base = state.tours.query()?.filter(visible_tours());
    let docs = QueryFeatures::new(base, &raw).apply().into_query().run();
    Ok(ListResponse::new(docs))
}

async fn get_tour(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SingleResponse<Value>>, ErrorBody> {
    get_tour_inner(&state, &id)
        .map(|doc| Json(SingleResponse::new(doc)))
        .map_err(|e| state.reporter.respond(&e))
}

fn get_tour_inner(state: &AppState, id: &str) -> Result<Value, AppError> {
    let doc = state.tours.get(id)?;
    // Secret tours stay invisible through direct lookups too.
    if doc.get("secret_tour") == Some(&Value::Bool(true)) {
        return Err(AppError::not_found("No tour found with that ID"));
    }
    Ok(doc)
}

async fn create_tour(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(draft): Json<TourDraft>,
) -> Result<(StatusCode, Json<SingleResponse<Value>>), ErrorBody> {
    create_tour_inner(&state, &headers, draft)
        .map(|doc| (StatusCode::CREATED, Json(SingleResponse::new(doc))))
        .map_err(|e| state.reporter.respond(&e))
}

fn create_tour_inner(
    state: &AppState,
    headers: &HeaderMap,
    draft: TourDraft,
) -> Result<Value, AppError> {
    authenticate(state, headers)?;
    draft
        .validate_new()
        .map_err(|messages| AppError::Validation { messages })?;
    Ok(state.tours.insert(draft.into_document())?)
}

async fn update_tour(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<TourDraft>,
) -> Result<Json<SingleResponse<Value>>, ErrorBody> {
    update_tour_inner(&state, &id, &headers, draft)
        .map(|doc| Json(SingleResponse::new(doc)))
        .map_err(|e| state.reporter.respond(&e))
}

fn update_tour_inner(
    state: &AppState,
    id: &str,
    headers: &HeaderMap,
    draft: TourDraft,
) -> Result<Value, AppError> {
    authenticate(state, headers)?;
    draft
        .validate_update()
        .map_err(|messages| AppError::Validation { messages })?;
    Ok(state.tours.update(id, draft.into_patch())?)
}

async fn delete_tour(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ErrorBody> {
    delete_tour_inner(&state, &id, &headers)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| state.reporter.respond(&e))
}

fn delete_tour_inner(state: &AppState, id: &str, headers: &HeaderMap) -> Result<(), AppError> {
    let user = authenticate(state, headers)?;
    require_role(&user, &["admin", "lead-guide"])?;
    Ok(state.tours.delete(id)?)
}

fn visible_tours() -> Predicate {
    let mut predicate = Predicate::new();
    predicate.insert("secret_tour".to_string(), json!({"$ne": true}));
    predicate
}
