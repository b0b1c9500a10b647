//! tourbase - A self-hostable tour booking REST backend

pub mod auth;
pub mod cli;
pub mod error;
pub mod http_server;
pub mod models;
pub mod observability;
pub mod query;
pub mod store;
