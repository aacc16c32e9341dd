//! Router composition.
//!
//! ## Structure
//! - **Admin endpoints** (`/api/admin`, bearer token required on every path,
//!   including unknown ones; bodies up to `max_upload_bytes`)
//!   - `PUT    /avatar`          replace the avatar image
//!   - `PUT    /site`            replace site settings
//!   - `POST   /article`         create an article
//!   - `PUT    /article`         update an article (previous version kept as backup)
//!   - `DELETE /article`         delete an article and all its slots
//!   - `PUT    /article/stage`   save a draft
//!   - `POST   /attachment`      upload an attachment (`?filename=&uuid=`)
//!   - `PUT    /attachment`      link an attachment to an article
//!   - `DELETE /attachment`      delete an attachment
//!   - `PUT    /init`            reset both indexes
//!   - `PUT    /recover`         restore both indexes from backup
//!
//! - **Public endpoints** (`/api/public`)
//!   - `GET    /file?path=`      read any stored object
//!   - `POST   /login`           exchange credentials for a token
//!
//! - **Probes**: `GET /healthz`, `GET /readyz`

use crate::{
    auth::require_bearer,
    errors::AppError,
    handlers::{
        admin_handlers::{
            create_article, delete_article, delete_attachment, init, put_avatar, put_site,
            recover, relink_attachment, stage_article, update_article, upload_attachment,
        },
        health_handlers::{healthz, readyz},
        public_handlers::{get_file, login},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/avatar", put(put_avatar))
        .route("/site", put(put_site))
        .route(
            "/article",
            post(create_article)
                .put(update_article)
                .delete(delete_article),
        )
        .route("/article/stage", put(stage_article))
        .route(
            "/attachment",
            post(upload_attachment)
                .put(relink_attachment)
                .delete(delete_attachment),
        )
        .route("/init", put(init))
        .route("/recover", put(recover))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(middleware::from_fn_with_state(state, require_bearer))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/file", get(get_file))
        .route("/login", post(login))
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route Not Found")
}

/// Build the complete application router with its shared state attached.
pub fn routes(state: AppState) -> Router {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/admin", admin_routes(state.clone()))
        .nest("/api/public", public_routes())
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
