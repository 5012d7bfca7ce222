//! Narration Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{NarrationRecord, NarrationRepositoryPort};
use crate::application::queries::GetNarration;

/// GetNarration Handler
pub struct GetNarrationHandler {
    narration_repo: Arc<dyn NarrationRepositoryPort>,
}

impl GetNarrationHandler {
    pub fn new(narration_repo: Arc<dyn NarrationRepositoryPort>) -> Self {
        Self { narration_repo }
    }

    pub async fn handle(&self, query: GetNarration) -> Result<NarrationRecord, ApplicationError> {
        self.narration_repo
            .find(query.story_id, &query.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Narration", query.story_id))
    }
}
