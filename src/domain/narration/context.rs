//! 段落上下文检测
//!
//! 根据故事分析结果，为每个文本段落找出最相关的情绪、音效和语调标签

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::analysis::{AnalysisEntry, StoryAnalysis};

/// 段落上下文（派生，不持久化）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentContext {
    pub primary_emotion: Option<String>,
    pub primary_sound: Option<String>,
    pub primary_modulation: Option<String>,
    /// 命中情绪条目的强度（1-10）
    #[serde(default)]
    pub emotion_intensity: Option<u8>,
}

impl SegmentContext {
    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.primary_emotion = Some(emotion.into());
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.primary_sound = Some(sound.into());
        self
    }

    pub fn with_modulation(mut self, modulation: impl Into<String>) -> Self {
        self.primary_modulation = Some(modulation.into());
        self
    }
}

/// 文本匹配器
///
/// 判断 needle（引用或上下文）是否出现在段落中
pub trait ContextMatcher: Send + Sync {
    fn matches(&self, segment: &str, needle: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// 忽略大小写的子串匹配
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl ContextMatcher for SubstringMatcher {
    fn matches(&self, segment: &str, needle: &str) -> bool {
        let needle = needle.trim();
        if needle.is_empty() {
            return false;
        }
        segment.to_lowercase().contains(&needle.to_lowercase())
    }

    fn name(&self) -> &'static str {
        "substring"
    }
}

/// 按词匹配：needle 的词序列必须完整出现在段落的词序列中
///
/// 避免 "art" 命中 "heart" 这类部分单词误判
#[derive(Debug, Clone, Copy, Default)]
pub struct WordMatcher;

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl ContextMatcher for WordMatcher {
    fn matches(&self, segment: &str, needle: &str) -> bool {
        let needle_tokens = tokenize(needle);
        if needle_tokens.is_empty() {
            return false;
        }
        let segment_tokens = tokenize(segment);
        segment_tokens
            .windows(needle_tokens.len())
            .any(|window| window == needle_tokens.as_slice())
    }

    fn name(&self) -> &'static str {
        "word"
    }
}

/// 匹配器类型（用于配置）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    #[default]
    Substring,
    Word,
}

impl MatcherKind {
    pub fn build(&self) -> Arc<dyn ContextMatcher> {
        match self {
            Self::Substring => Arc::new(SubstringMatcher),
            Self::Word => Arc::new(WordMatcher),
        }
    }
}

/// 先按 quote 找第一个命中，再按 context 找第一个命中
fn find_entry<'a>(
    entries: &'a [AnalysisEntry],
    segment: &str,
    matcher: &dyn ContextMatcher,
) -> Option<&'a AnalysisEntry> {
    entries
        .iter()
        .find(|e| matcher.matches(segment, &e.quote))
        .or_else(|| entries.iter().find(|e| matcher.matches(segment, &e.context)))
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 检测段落上下文
///
/// 没有分析数据或没有命中时字段为空，从不报错。
/// 语调取故事级的 mood_category，缺失时退回 genre。
pub fn detect_context(
    segment: &str,
    analysis: Option<&StoryAnalysis>,
    matcher: &dyn ContextMatcher,
) -> SegmentContext {
    let Some(analysis) = analysis else {
        return SegmentContext::default();
    };

    let emotion = find_entry(&analysis.emotions, segment, matcher);
    let sound = find_entry(&analysis.sounds, segment, matcher);

    SegmentContext {
        primary_emotion: emotion.and_then(|e| non_blank(Some(&e.label))),
        primary_sound: sound.and_then(|s| non_blank(Some(&s.label))),
        primary_modulation: non_blank(analysis.mood_category.as_ref())
            .or_else(|| non_blank(analysis.genre.as_ref())),
        emotion_intensity: emotion.and_then(|e| e.intensity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> StoryAnalysis {
        StoryAnalysis {
            emotions: vec![
                AnalysisEntry::new("joy", "She laughed", "the party").with_intensity(8),
                AnalysisEntry::new("sorrow", "tears fell", "the funeral"),
            ],
            sounds: vec![AnalysisEntry::new("thunder", "a loud crack", "storm")],
            mood_category: Some("suspense".to_string()),
            genre: Some("mystery".to_string()),
        }
    }

    #[test]
    fn test_quote_match_is_case_insensitive() {
        let ctx = detect_context("He laughed loudly.", Some(&analysis()), &SubstringMatcher);
        assert_eq!(ctx.primary_emotion, None);

        let ctx = detect_context("SHE LAUGHED at the joke.", Some(&analysis()), &SubstringMatcher);
        assert_eq!(ctx.primary_emotion.as_deref(), Some("joy"));
        assert_eq!(ctx.emotion_intensity, Some(8));
    }

    #[test]
    fn test_quote_pass_wins_over_earlier_context_match() {
        // 第一条的 context 和第二条的 quote 同时命中，quote 优先
        let text = "At the party, tears fell silently.";
        let ctx = detect_context(text, Some(&analysis()), &SubstringMatcher);
        assert_eq!(ctx.primary_emotion.as_deref(), Some("sorrow"));
    }

    #[test]
    fn test_context_fallback() {
        let ctx = detect_context("The storm rolled in.", Some(&analysis()), &SubstringMatcher);
        assert_eq!(ctx.primary_sound.as_deref(), Some("thunder"));
        assert_eq!(ctx.primary_emotion, None);
    }

    #[test]
    fn test_modulation_falls_back_to_genre() {
        let mut a = analysis();
        assert_eq!(
            detect_context("x", Some(&a), &SubstringMatcher).primary_modulation.as_deref(),
            Some("suspense")
        );
        a.mood_category = None;
        assert_eq!(
            detect_context("x", Some(&a), &SubstringMatcher).primary_modulation.as_deref(),
            Some("mystery")
        );
    }

    #[test]
    fn test_missing_analysis_yields_empty_context() {
        let ctx = detect_context("anything", None, &SubstringMatcher);
        assert_eq!(ctx, SegmentContext::default());
    }

    #[test]
    fn test_empty_needles_never_match() {
        let a = StoryAnalysis {
            emotions: vec![AnalysisEntry::new("joy", "", "  ")],
            ..Default::default()
        };
        let ctx = detect_context("any text", Some(&a), &SubstringMatcher);
        assert_eq!(ctx.primary_emotion, None);
    }

    #[test]
    fn test_word_matcher_rejects_partial_words() {
        assert!(SubstringMatcher.matches("Her heart raced", "art"));
        assert!(!WordMatcher.matches("Her heart raced", "art"));
        assert!(WordMatcher.matches("Her HEART, raced!", "heart raced"));
    }
}
