//! Shared context for API routes and middleware.

use std::sync::Arc;

use crate::state::AppState;

/// Cloneable handle passed to every route and middleware layer.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}
