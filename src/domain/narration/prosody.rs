//! 通用音色的情绪韵律映射
//!
//! 确定性查表：情绪 -> 音色角色、情绪 -> 基础语速，外加强度缩放和样本文本修饰

use serde::{Deserialize, Serialize};

use super::analysis::DEFAULT_INTENSITY;

/// 中性情绪标签
pub const NEUTRAL_EMOTION: &str = "neutral";

/// 未映射情绪使用的默认角色
pub const DEFAULT_PERSONA: &str = "alloy";

/// 语速下限
pub const MIN_SPEECH_RATE: f32 = 0.5;
/// 语速上限
pub const MAX_SPEECH_RATE: f32 = 2.0;

/// 样本文本默认最大字符数
pub const DEFAULT_SAMPLE_MAX_CHARS: usize = 100;

/// 通用合成参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prosody {
    pub emotion: String,
    pub persona: String,
    pub rate: f32,
}

impl Prosody {
    /// 根据检测到的情绪与强度计算合成参数，情绪缺失时取 neutral
    pub fn for_emotion(emotion: Option<&str>, intensity: Option<u8>) -> Self {
        let emotion = emotion
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(NEUTRAL_EMOTION)
            .to_lowercase();
        Self {
            persona: persona_for(&emotion).to_string(),
            rate: speech_rate(&emotion, intensity.unwrap_or(DEFAULT_INTENSITY)),
            emotion,
        }
    }
}

/// 情绪 -> 音色角色
pub fn persona_for(emotion: &str) -> &'static str {
    match emotion.trim().to_lowercase().as_str() {
        "joy" | "happy" | "happiness" | "delight" => "nova",
        "excitement" | "excited" | "surprise" => "shimmer",
        "sorrow" | "sad" | "sadness" | "grief" | "melancholy" => "echo",
        "anger" | "angry" | "rage" | "determination" => "onyx",
        "fear" | "scared" | "anxiety" | "mystery" => "fable",
        _ => DEFAULT_PERSONA,
    }
}

/// 情绪 -> 基础语速（1.0 为基线）
pub fn base_rate(emotion: &str) -> f32 {
    match emotion.trim().to_lowercase().as_str() {
        "excitement" | "excited" => 1.2,
        "anger" | "angry" | "rage" => 1.15,
        "joy" | "happy" | "happiness" | "surprise" | "fear" | "scared" | "anxiety" => 1.1,
        "calm" | "peaceful" | "wonder" => 0.9,
        "sorrow" | "sad" | "sadness" | "grief" | "melancholy" => 0.85,
        _ => 1.0,
    }
}

/// 强度 1-10 线性映射到 [0.8, 1.2]，越界值先夹到 1-10
pub fn intensity_multiplier(intensity: u8) -> f32 {
    let level = intensity.clamp(1, 10) as f32;
    0.8 + (level - 1.0) * (0.4 / 9.0)
}

/// 最终语速，夹在 [0.5, 2.0]
pub fn speech_rate(emotion: &str, intensity: u8) -> f32 {
    (base_rate(emotion) * intensity_multiplier(intensity)).clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE)
}

/// 情绪样本文本：加情绪引导语并截断
///
/// 例如 `With joy: Hello there...`；neutral 不加引导语
pub fn frame_sample_text(emotion: &str, text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let body = if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated.trim_end())
    } else {
        text.to_string()
    };

    let emotion = emotion.trim();
    if emotion.is_empty() || emotion.eq_ignore_ascii_case(NEUTRAL_EMOTION) {
        body
    } else {
        format!("With {}: {}", emotion.to_lowercase(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_mapping() {
        assert_eq!(persona_for("Joy"), "nova");
        assert_eq!(persona_for("sorrow"), "echo");
        assert_eq!(persona_for("bewildered"), DEFAULT_PERSONA);
    }

    #[test]
    fn test_intensity_multiplier_range() {
        assert!((intensity_multiplier(1) - 0.8).abs() < 1e-6);
        assert!((intensity_multiplier(10) - 1.2).abs() < 1e-6);
        assert!((intensity_multiplier(0) - 0.8).abs() < 1e-6);
        assert!((intensity_multiplier(200) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_rate_always_clamped() {
        let emotions = [
            "excitement", "anger", "joy", "calm", "sorrow", "neutral", "unknown", "",
        ];
        for emotion in emotions {
            for intensity in 0..=u8::MAX {
                let rate = speech_rate(emotion, intensity);
                assert!(
                    (MIN_SPEECH_RATE..=MAX_SPEECH_RATE).contains(&rate),
                    "rate {} out of range for {}/{}",
                    rate,
                    emotion,
                    intensity
                );
            }
        }
    }

    #[test]
    fn test_excitement_faster_than_sorrow() {
        assert!(speech_rate("excitement", 5) > speech_rate("neutral", 5));
        assert!(speech_rate("sorrow", 5) < speech_rate("neutral", 5));
    }

    #[test]
    fn test_prosody_defaults_to_neutral() {
        let prosody = Prosody::for_emotion(None, None);
        assert_eq!(prosody.emotion, NEUTRAL_EMOTION);
        assert_eq!(prosody.persona, DEFAULT_PERSONA);
        assert!((prosody.rate - intensity_multiplier(DEFAULT_INTENSITY)).abs() < 1e-6);
    }

    #[test]
    fn test_frame_sample_text() {
        assert_eq!(frame_sample_text("Joy", "Hello there", 100), "With joy: Hello there");
        assert_eq!(frame_sample_text("neutral", "Hello", 100), "Hello");

        let long = "a".repeat(150);
        let framed = frame_sample_text("sorrow", &long, 100);
        assert_eq!(framed, format!("With sorrow: {}...", "a".repeat(100)));
    }
}
