//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::RecordingCatalogPort;
use crate::application::queries::SelectVoice;
use crate::domain::narration::{category_voice, select_voice_with, SelectionPolicy, VoiceSelection};
use crate::domain::recording::RecordingCategory;

/// 音色选择诊断响应
#[derive(Debug, Clone)]
pub struct VoiceSelectionResponse {
    pub selection: VoiceSelection,
    /// 目录中录音总数
    pub total_recordings: usize,
    /// 带克隆音色的录音数
    pub cloned_recordings: usize,
    /// 各分类聚合音色（未达阈值为 None）
    pub category_voices: Vec<(RecordingCategory, Option<String>)>,
}

/// SelectVoice Handler
pub struct SelectVoiceHandler {
    catalog: Arc<dyn RecordingCatalogPort>,
    policy: SelectionPolicy,
}

impl SelectVoiceHandler {
    pub fn new(catalog: Arc<dyn RecordingCatalogPort>) -> Self {
        Self {
            catalog,
            policy: SelectionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn handle(&self, query: SelectVoice) -> Result<VoiceSelectionResponse, ApplicationError> {
        let catalog = self.catalog.find_by_user(&query.user_id).await?;
        let selection = select_voice_with(&self.policy, &query.context, &catalog);

        tracing::debug!(
            user_id = %query.user_id,
            voice_type = %selection.selection_type,
            voice_id = ?selection.voice_id,
            "Voice selection evaluated"
        );

        Ok(VoiceSelectionResponse {
            total_recordings: catalog.len(),
            cloned_recordings: catalog.iter().filter(|r| r.cloned_voice().is_some()).count(),
            category_voices: RecordingCategory::ALL
                .iter()
                .map(|c| (*c, category_voice(*c, &catalog, &self.policy)))
                .collect(),
            selection,
        })
    }
}
