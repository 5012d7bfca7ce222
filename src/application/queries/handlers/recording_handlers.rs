//! Recording Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::RecordingCatalogPort;
use crate::application::queries::ListRecordings;
use crate::domain::recording::VoiceRecording;

/// ListRecordings Handler
pub struct ListRecordingsHandler {
    catalog: Arc<dyn RecordingCatalogPort>,
}

impl ListRecordingsHandler {
    pub fn new(catalog: Arc<dyn RecordingCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: ListRecordings) -> Result<Vec<VoiceRecording>, ApplicationError> {
        Ok(self.catalog.find_by_user(&query.user_id).await?)
    }
}
