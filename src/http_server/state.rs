//! # Shared Application State
//!
//! Per-process state shared by every route: the two collections, the token
//! manager and the error reporter. Collections clone cheaply (shared
//! documents), so handlers take the state by `Arc`.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::error::ErrorReporter;
use crate::store::Collection;

use super::config::ServerConfig;

pub struct AppState {
    pub tours: Collection,
    pub users: Collection,
    pub jwt: JwtManager,
    pub reporter: ErrorReporter,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            tours: Collection::new("tours", "tour").with_unique("name"),
            users: Collection::new("users", "user")
                .with_unique("email")
                .with_hidden("password"),
            jwt: JwtManager::new(config.jwt_config()),
            reporter: ErrorReporter::new(config.mode),
        }
    }
}

pub type SharedState = Arc<AppState>;
