//! Voice Queries

use crate::domain::narration::SegmentContext;

/// 音色选择诊断查询：给定上下文，查看会选中哪个音色
#[derive(Debug, Clone)]
pub struct SelectVoice {
    pub user_id: String,
    pub context: SegmentContext,
}
