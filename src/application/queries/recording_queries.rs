//! Recording Queries

/// 列出用户录音查询
#[derive(Debug, Clone)]
pub struct ListRecordings {
    pub user_id: String,
}
