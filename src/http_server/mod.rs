//! # HTTP Server Module
//!
//! Axum surface of the backend: configuration, shared state, request
//! guards, response envelopes and the tour/user routers. Every handler
//! funnels failures through the state's error reporter, the single terminal
//! error path.

pub mod config;
pub mod guard;
pub mod response;
pub mod server;
pub mod state;
pub mod tour_routes;
pub mod user_routes;

pub use config::ServerConfig;
pub use server::HttpServer;
pub use state::{AppState, SharedState};
