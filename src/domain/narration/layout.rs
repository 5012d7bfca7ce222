//! 音频存储路径布局
//!
//! 路径格式:
//! `narrations/{user}/{story}/{conversation_style}/{narrator_profile}/{emotion_label}_{timestamp}_{disambiguator}.{ext}`
//!
//! 同一 key 的文件放在同一目录，按 `{emotion_label}_` 前缀列目录即可复用历史产物。
//! 时间戳 + 随机后缀保证不同次生成互不覆盖。

use chrono::Utc;
use uuid::Uuid;

use super::analysis::DEFAULT_INTENSITY;
use super::selection::VoiceSelection;
use crate::domain::recording::AudioFormat;

/// 根目录名
pub const NARRATIONS_ROOT: &str = "narrations";

/// 通用音色的 narrator profile
pub const GENERIC_PROFILE: &str = "generic";

/// 路径分量只保留 [A-Za-z0-9-]，其余替换为 '-'
///
/// '_' 是文件名分隔符，标签里不能出现。被改写过的值追加原值 md5 前 8 位，
/// 保证 `a.b` 和 `a-b` 落在不同目录。
pub fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else if cleaned == value {
        cleaned
    } else {
        format!("{}-{}", cleaned, short_digest(value))
    }
}

fn short_digest(value: &str) -> String {
    let digest = format!("{:x}", md5::compute(value.as_bytes()));
    digest[..8].to_string()
}

/// 段落音频的情绪标签: `{emotion}-{md5(text) 前 12 位}`
pub fn segment_label(emotion: Option<&str>, text: &str) -> String {
    let emotion = emotion
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or("neutral")
        .to_lowercase();
    let digest = format!("{:x}", md5::compute(text.as_bytes()));
    format!("{}-{}", emotion, &digest[..12])
}

/// 通用音色的标签另带强度，强度决定语速: `{emotion}-{md5}-i{intensity}`
pub fn generic_segment_label(emotion: Option<&str>, intensity: Option<u8>, text: &str) -> String {
    format!(
        "{}-i{}",
        segment_label(emotion, text),
        intensity.unwrap_or(DEFAULT_INTENSITY).clamp(1, 10)
    )
}

/// 根据音色选择得到 narrator profile
pub fn narrator_profile(selection: &VoiceSelection) -> String {
    match selection.voice_id.as_deref() {
        Some(voice_id) if selection.is_personalized() => voice_id.to_string(),
        _ => GENERIC_PROFILE.to_string(),
    }
}

/// 路径 key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPathKey {
    pub user_id: String,
    pub story_id: i64,
    pub conversation_style: String,
    pub narrator_profile: String,
    pub emotion_label: String,
}

impl AudioPathKey {
    pub fn new(
        user_id: impl Into<String>,
        story_id: i64,
        conversation_style: impl Into<String>,
        narrator_profile: impl Into<String>,
        emotion_label: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            story_id,
            conversation_style: conversation_style.into(),
            narrator_profile: narrator_profile.into(),
            emotion_label: emotion_label.into(),
        }
    }

    /// 目标目录（相对存储根目录）
    pub fn directory(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            NARRATIONS_ROOT,
            sanitize_component(&self.user_id),
            self.story_id,
            sanitize_component(&self.conversation_style),
            sanitize_component(&self.narrator_profile),
        )
    }

    /// 缓存查找前缀
    pub fn file_prefix(&self) -> String {
        format!("{}_", sanitize_component(&self.emotion_label))
    }

    pub fn file_name(&self, timestamp_ms: i64, disambiguator: &str, format: AudioFormat) -> String {
        format!(
            "{}{}_{}.{}",
            self.file_prefix(),
            timestamp_ms,
            sanitize_component(disambiguator),
            format.extension()
        )
    }

    pub fn path(&self, timestamp_ms: i64, disambiguator: &str, format: AudioFormat) -> String {
        format!(
            "{}/{}",
            self.directory(),
            self.file_name(timestamp_ms, disambiguator, format)
        )
    }

    /// 以当前时间和随机后缀生成新路径
    pub fn new_path(&self, format: AudioFormat) -> String {
        let disambiguator = Uuid::new_v4().simple().to_string();
        self.path(Utc::now().timestamp_millis(), &disambiguator[..8], format)
    }

    /// 在目录列表中找出该标签最新的产物（文件名）
    pub fn find_cached<'a>(&self, file_names: &'a [String]) -> Option<&'a str> {
        let prefix = self.file_prefix();
        file_names
            .iter()
            .filter_map(|name| {
                let rest = name.strip_prefix(&prefix)?;
                let (stem, ext) = rest.rsplit_once('.')?;
                AudioFormat::from_extension(ext)?;
                let timestamp: i64 = stem.split('_').next()?.parse().ok()?;
                Some((timestamp, name.as_str()))
            })
            .max()
            .map(|(_, name)| name)
    }
}
