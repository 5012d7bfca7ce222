//! 故事分析数据
//!
//! 由外部分析服务从原始文本中提取，这里只消费不生成

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 默认情绪强度（1-10）
pub const DEFAULT_INTENSITY: u8 = 5;

/// 把任意分值收敛到 1-10，小数四舍五入
pub fn clamp_intensity(raw: f64) -> u8 {
    raw.round().clamp(1.0, 10.0) as u8
}

/// 强度字段按数字读写：接受任意数字，取整后限制在 1-10
mod intensity_score {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        value.map(f64::from).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(raw.filter(|v| v.is_finite()).map(clamp_intensity))
    }
}

/// 分析条目：标签 + 原文引用 + 上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub label: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub context: String,
    /// 情绪强度 1-10，音效条目通常为空
    #[serde(default, with = "intensity_score")]
    pub intensity: Option<u8>,
}

impl AnalysisEntry {
    pub fn new(label: impl Into<String>, quote: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            quote: quote.into(),
            context: context.into(),
            intensity: None,
        }
    }

    pub fn with_intensity(mut self, intensity: u8) -> Self {
        self.intensity = Some(intensity);
        self
    }
}

/// 整个故事的分析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryAnalysis {
    #[serde(default)]
    pub emotions: Vec<AnalysisEntry>,
    #[serde(default, alias = "sound_effects", alias = "soundEffects")]
    pub sounds: Vec<AnalysisEntry>,
    #[serde(default, alias = "moodCategory")]
    pub mood_category: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

impl StoryAnalysis {
    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty()
            && self.sounds.is_empty()
            && self.mood_category.is_none()
            && self.genre.is_none()
    }
}
