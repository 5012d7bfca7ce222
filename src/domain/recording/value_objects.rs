//! Recording Context - Value Objects

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::RecordingError;

/// 录音分类
///
/// 每条录音只属于一个分类：情绪 / 音效 / 语调调制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingCategory {
    Emotion,
    Sound,
    Modulation,
}

impl RecordingCategory {
    /// 全部分类，按选择优先级排列（emotion > sound > modulation）
    pub const ALL: [RecordingCategory; 3] = [
        RecordingCategory::Emotion,
        RecordingCategory::Sound,
        RecordingCategory::Modulation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emotion => "emotion",
            Self::Sound => "sound",
            Self::Modulation => "modulation",
        }
    }

    /// 复数形式，用于 VoiceSelection.category
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Emotion => "emotions",
            Self::Sound => "sounds",
            Self::Modulation => "modulations",
        }
    }
}

impl FromStr for RecordingCategory {
    type Err = RecordingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "emotion" | "emotions" => Ok(Self::Emotion),
            "sound" | "sounds" => Ok(Self::Sound),
            "modulation" | "modulations" => Ok(Self::Modulation),
            other => Err(RecordingError::InvalidCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for RecordingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "flac" => Some(Self::Flac),
            "ogg" => Some(Self::Ogg),
            _ => None,
        }
    }

    /// 根据 HTTP Content-Type 推断格式，无法识别时返回 None
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match mime.as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            "audio/ogg" | "audio/opus" => Some(Self::Ogg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
        }
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::Mp3
    }
}
