//! Shared state handed to every handler.

use std::sync::Arc;

use crate::{
    auth::AuthConfig, config::DEFAULT_MAX_UPLOAD_BYTES, services::blog_service::BlogService,
};

#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub auth: Arc<AuthConfig>,
    /// Body limit for the admin routes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(blog: BlogService, auth: AuthConfig) -> Self {
        Self {
            blog,
            auth: Arc::new(auth),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }
}
