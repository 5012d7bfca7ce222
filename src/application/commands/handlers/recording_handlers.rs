//! Recording Command Handlers

use std::sync::Arc;

use crate::application::commands::{DeleteRecording, RegisterRecording, SetRecordingLock};
use crate::application::error::ApplicationError;
use crate::application::ports::{NewRecording, RecordingCatalogPort};
use crate::domain::recording::{RecordingError, VoiceRecording};

// ============================================================================
// RegisterRecording
// ============================================================================

/// RegisterRecording Handler
pub struct RegisterRecordingHandler {
    catalog: Arc<dyn RecordingCatalogPort>,
}

impl RegisterRecordingHandler {
    pub fn new(catalog: Arc<dyn RecordingCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, command: RegisterRecording) -> Result<VoiceRecording, ApplicationError> {
        VoiceRecording::validate_name(&command.name)?;
        if command.user_id.trim().is_empty() {
            return Err(ApplicationError::validation("User id cannot be empty"));
        }
        if !(command.duration_seconds.is_finite() && command.duration_seconds >= 0.0) {
            return Err(ApplicationError::validation("Duration must be a non-negative number"));
        }

        let cloned_voice_id = command
            .cloned_voice_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        let recording = self
            .catalog
            .save(NewRecording {
                user_id: command.user_id,
                category: command.category,
                name: command.name.trim().to_lowercase(),
                // 带克隆音色的录音视为已验证，直接锁定
                is_locked: cloned_voice_id.is_some(),
                cloned_voice_id,
                duration_seconds: command.duration_seconds,
                audio_url: command.audio_url,
                story_id: command.story_id,
            })
            .await?;

        tracing::info!(
            recording_id = recording.id,
            user_id = %recording.user_id,
            category = %recording.category,
            name = %recording.name,
            "Recording registered"
        );

        Ok(recording)
    }
}

// ============================================================================
// DeleteRecording
// ============================================================================

/// DeleteRecording Handler
///
/// 返回被删除的录音，调用方据此清理音频文件
pub struct DeleteRecordingHandler {
    catalog: Arc<dyn RecordingCatalogPort>,
}

impl DeleteRecordingHandler {
    pub fn new(catalog: Arc<dyn RecordingCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, command: DeleteRecording) -> Result<VoiceRecording, ApplicationError> {
        let recording = self
            .catalog
            .find_by_id(command.recording_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Recording", command.recording_id))?;

        if recording.is_locked {
            return Err(ApplicationError::business_rule(
                RecordingError::Locked(recording.id).to_string(),
            ));
        }

        self.catalog.delete(recording.id).await?;

        tracing::info!(
            recording_id = recording.id,
            user_id = %recording.user_id,
            "Recording deleted"
        );

        Ok(recording)
    }
}

// ============================================================================
// SetRecordingLock
// ============================================================================

/// SetRecordingLock Handler
pub struct SetRecordingLockHandler {
    catalog: Arc<dyn RecordingCatalogPort>,
}

impl SetRecordingLockHandler {
    pub fn new(catalog: Arc<dyn RecordingCatalogPort>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, command: SetRecordingLock) -> Result<(), ApplicationError> {
        self.catalog
            .find_by_id(command.recording_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Recording", command.recording_id))?;

        self.catalog
            .set_locked(command.recording_id, command.locked)
            .await?;

        tracing::info!(
            recording_id = command.recording_id,
            locked = command.locked,
            "Recording lock updated"
        );

        Ok(())
    }
}
