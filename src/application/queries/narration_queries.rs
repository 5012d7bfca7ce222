//! Narration Queries

/// 获取最近一次旁白查询
#[derive(Debug, Clone)]
pub struct GetNarration {
    pub story_id: i64,
    pub user_id: String,
}
