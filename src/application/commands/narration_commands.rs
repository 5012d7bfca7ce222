//! Narration Commands

/// 生成旁白命令
#[derive(Debug, Clone)]
pub struct GenerateNarration {
    pub story_id: i64,
    pub user_id: String,
    pub content: String,
    pub segments: Vec<String>,
    /// 为空时使用配置中的默认风格
    pub conversation_style: Option<String>,
}

/// 生成情绪样本命令（通用音色试听）
#[derive(Debug, Clone)]
pub struct GenerateEmotionSample {
    pub user_id: String,
    pub story_id: Option<i64>,
    pub emotion: String,
    pub intensity: Option<u8>,
    pub text: String,
}
