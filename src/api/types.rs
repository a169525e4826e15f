//! Shared types for the API layer.

use std::sync::Arc;

use crate::recommend::RecommendationEngine;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub engine: Arc<RecommendationEngine>,
}

impl ApiContext {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
