//! Recording Commands

use crate::domain::recording::RecordingCategory;

/// 登记录音命令
#[derive(Debug, Clone)]
pub struct RegisterRecording {
    pub user_id: String,
    pub category: RecordingCategory,
    pub name: String,
    pub cloned_voice_id: Option<String>,
    pub duration_seconds: f64,
    pub audio_url: String,
    pub story_id: Option<i64>,
}

/// 删除录音命令
#[derive(Debug, Clone)]
pub struct DeleteRecording {
    pub recording_id: i64,
}

/// 锁定/解锁录音命令
#[derive(Debug, Clone)]
pub struct SetRecordingLock {
    pub recording_id: i64,
    pub locked: bool,
}
