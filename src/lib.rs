//! Blog content store: an HTTP API keeping articles, attachments and site
//! settings in an object store, with single-generation backups of every
//! index it rewrites.

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;

/// Router for the whole service.
pub fn app(state: AppState) -> axum::Router {
    routes::routes::routes(state)
}
