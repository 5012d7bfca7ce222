//! 音色选择引擎
//!
//! 按四级优先级为段落选择音色来源：
//! 1. 单情绪音色：同名情绪录音（带克隆音色）数量 >= 6
//! 2. 分类聚合音色：某分类内带克隆音色的录音 >= 3，取出现最多的克隆音色，
//!    按 emotion > sound > modulation 顺序尝试
//! 3. 组合音色：全部带克隆音色的录音 >= 5，取出现最多的克隆音色
//! 4. 通用音色：无法个性化
//!
//! 纯函数，无副作用。多数票平局时取录音 ID 最小（最早录制）的那个克隆音色，
//! 结果与目录顺序无关。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::context::SegmentContext;
use crate::domain::recording::{RecordingCategory, VoiceRecording};

/// 选择结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceSelectionType {
    IndividualEmotion,
    CategoryVoice,
    CombinedVoice,
    GenericVoice,
}

impl VoiceSelectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndividualEmotion => "individual_emotion",
            Self::CategoryVoice => "category_voice",
            Self::CombinedVoice => "combined_voice",
            Self::GenericVoice => "generic_voice",
        }
    }
}

impl std::fmt::Display for VoiceSelectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 音色选择决策
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSelection {
    #[serde(rename = "type")]
    pub selection_type: VoiceSelectionType,
    pub voice_id: Option<String>,
    pub emotion: Option<String>,
    pub category: Option<String>,
}

impl VoiceSelection {
    pub fn generic() -> Self {
        Self {
            selection_type: VoiceSelectionType::GenericVoice,
            voice_id: None,
            emotion: None,
            category: None,
        }
    }

    pub fn individual(voice_id: impl Into<String>, emotion: impl Into<String>) -> Self {
        Self {
            selection_type: VoiceSelectionType::IndividualEmotion,
            voice_id: Some(voice_id.into()),
            emotion: Some(emotion.into()),
            category: None,
        }
    }

    pub fn category(voice_id: impl Into<String>, category: RecordingCategory) -> Self {
        Self {
            selection_type: VoiceSelectionType::CategoryVoice,
            voice_id: Some(voice_id.into()),
            emotion: None,
            category: Some(category.plural().to_string()),
        }
    }

    pub fn combined(voice_id: impl Into<String>) -> Self {
        Self {
            selection_type: VoiceSelectionType::CombinedVoice,
            voice_id: Some(voice_id.into()),
            emotion: None,
            category: None,
        }
    }

    /// 是否走声音克隆
    pub fn is_personalized(&self) -> bool {
        self.selection_type != VoiceSelectionType::GenericVoice
    }
}

/// 各级阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    pub individual_min: usize,
    pub category_min: usize,
    pub combined_min: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            individual_min: 6,
            category_min: 3,
            combined_min: 5,
        }
    }
}

/// 多数票克隆音色
///
/// 次数最多者胜；平局时取携带该音色的最小录音 ID 更小者
fn majority_voice<'a>(recordings: impl IntoIterator<Item = &'a VoiceRecording>) -> Option<String> {
    let mut tally: HashMap<&str, (usize, i64)> = HashMap::new();
    for recording in recordings {
        if let Some(voice_id) = recording.cloned_voice() {
            let entry = tally.entry(voice_id).or_insert((0, recording.id));
            entry.0 += 1;
            entry.1 = entry.1.min(recording.id);
        }
    }

    tally
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(voice_id, _)| voice_id.to_string())
}

/// 分类聚合音色：该分类带克隆音色的录音数达到阈值才产出
pub fn category_voice(
    category: RecordingCategory,
    catalog: &[VoiceRecording],
    policy: &SelectionPolicy,
) -> Option<String> {
    let cloned: Vec<&VoiceRecording> = catalog
        .iter()
        .filter(|r| r.category == category && r.cloned_voice().is_some())
        .collect();

    if cloned.len() < policy.category_min {
        return None;
    }
    majority_voice(cloned)
}

fn individual_emotion_voice(
    emotion: &str,
    catalog: &[VoiceRecording],
    policy: &SelectionPolicy,
) -> Option<String> {
    let matching: Vec<&VoiceRecording> = catalog
        .iter()
        .filter(|r| {
            r.category == RecordingCategory::Emotion
                && r.is_labelled(emotion)
                && r.cloned_voice().is_some()
        })
        .collect();

    if matching.len() < policy.individual_min {
        return None;
    }
    matching
        .into_iter()
        .min_by_key(|r| r.id)
        .and_then(|r| r.cloned_voice())
        .map(str::to_string)
}

fn combined_voice(catalog: &[VoiceRecording], policy: &SelectionPolicy) -> Option<String> {
    let cloned_count = catalog.iter().filter(|r| r.cloned_voice().is_some()).count();
    if cloned_count < policy.combined_min {
        return None;
    }
    majority_voice(catalog)
}

/// 使用默认阈值选择音色
pub fn select_voice(context: &SegmentContext, catalog: &[VoiceRecording]) -> VoiceSelection {
    select_voice_with(&SelectionPolicy::default(), context, catalog)
}

/// 按给定阈值选择音色，第一个满足的层级胜出
pub fn select_voice_with(
    policy: &SelectionPolicy,
    context: &SegmentContext,
    catalog: &[VoiceRecording],
) -> VoiceSelection {
    if let Some(emotion) = context.primary_emotion.as_deref() {
        if let Some(voice_id) = individual_emotion_voice(emotion, catalog, policy) {
            return VoiceSelection::individual(voice_id, emotion);
        }
    }

    let labelled = [
        (RecordingCategory::Emotion, &context.primary_emotion),
        (RecordingCategory::Sound, &context.primary_sound),
        (RecordingCategory::Modulation, &context.primary_modulation),
    ];
    for (category, label) in labelled {
        if label.is_none() {
            continue;
        }
        if let Some(voice_id) = category_voice(category, catalog, policy) {
            return VoiceSelection::category(voice_id, category);
        }
    }

    if let Some(voice_id) = combined_voice(catalog, policy) {
        return VoiceSelection::combined(voice_id);
    }

    VoiceSelection::generic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rec(id: i64, category: RecordingCategory, name: &str, voice: Option<&str>) -> VoiceRecording {
        VoiceRecording {
            id,
            user_id: "user-1".to_string(),
            category,
            name: name.to_string(),
            cloned_voice_id: voice.map(str::to_string),
            is_locked: true,
            duration_seconds: 5.0,
            audio_url: format!("/recordings/user-1/{}.wav", id),
            story_id: None,
            created_at: Utc::now(),
        }
    }

    fn joy_recordings(n: i64) -> Vec<VoiceRecording> {
        (1..=n)
            .map(|i| rec(i, RecordingCategory::Emotion, "joy", Some("voice-joy")))
            .collect()
    }

    fn joy_context() -> SegmentContext {
        SegmentContext::default().with_emotion("joy")
    }

    #[test]
    fn test_individual_threshold() {
        let five = select_voice(&joy_context(), &joy_recordings(5));
        assert_ne!(five.selection_type, VoiceSelectionType::IndividualEmotion);

        let six = select_voice(&joy_context(), &joy_recordings(6));
        assert_eq!(six, VoiceSelection::individual("voice-joy", "joy"));
    }

    #[test]
    fn test_individual_beats_category() {
        // 6 条 joy 同时满足单情绪（>=6）和分类聚合（>=3）
        let mut catalog = joy_recordings(6);
        catalog.push(rec(7, RecordingCategory::Emotion, "anger", Some("voice-anger")));
        let selection = select_voice(&joy_context(), &catalog);
        assert_eq!(selection.selection_type, VoiceSelectionType::IndividualEmotion);
    }

    #[test]
    fn test_individual_uses_earliest_recording() {
        let mut catalog: Vec<VoiceRecording> = (10..16)
            .map(|i| rec(i, RecordingCategory::Emotion, "JOY", Some("voice-late")))
            .collect();
        catalog.push(rec(3, RecordingCategory::Emotion, "joy", Some("voice-early")));
        let selection = select_voice(&joy_context(), &catalog);
        assert_eq!(selection.voice_id.as_deref(), Some("voice-early"));
    }

    #[test]
    fn test_category_threshold_and_precedence() {
        let sounds = vec![
            rec(1, RecordingCategory::Sound, "rain", Some("voice-s")),
            rec(2, RecordingCategory::Sound, "wind", Some("voice-s")),
        ];
        let ctx = SegmentContext::default().with_sound("rain");
        assert_eq!(select_voice(&ctx, &sounds), VoiceSelection::generic());

        let mut sounds = sounds;
        sounds.push(rec(3, RecordingCategory::Sound, "thunder", Some("voice-s")));
        assert_eq!(
            select_voice(&ctx, &sounds),
            VoiceSelection::category("voice-s", RecordingCategory::Sound)
        );

        // emotion 分类优先于 sound
        let mut both = sounds.clone();
        for i in 4..7 {
            both.push(rec(i, RecordingCategory::Emotion, "calm", Some("voice-e")));
        }
        let ctx = ctx.with_emotion("joy");
        let selection = select_voice(&ctx, &both);
        assert_eq!(selection.voice_id.as_deref(), Some("voice-e"));
        assert_eq!(selection.category.as_deref(), Some("emotions"));
    }

    #[test]
    fn test_category_requires_context_label() {
        let catalog: Vec<VoiceRecording> = (1..=3)
            .map(|i| rec(i, RecordingCategory::Modulation, "whisper", Some("voice-m")))
            .collect();
        // 没有任何上下文标签，且总数不足组合阈值
        assert_eq!(
            select_voice(&SegmentContext::default(), &catalog),
            VoiceSelection::generic()
        );
        let ctx = SegmentContext::default().with_modulation("suspense");
        assert_eq!(
            select_voice(&ctx, &catalog).selection_type,
            VoiceSelectionType::CategoryVoice
        );
    }

    #[test]
    fn test_combined_threshold() {
        let mixed = |n: i64| -> Vec<VoiceRecording> {
            let categories = RecordingCategory::ALL;
            (1..=n)
                .map(|i| rec(i, categories[(i as usize) % 3], "x", Some("voice-all")))
                .collect()
        };
        let ctx = SegmentContext::default();
        assert_eq!(select_voice(&ctx, &mixed(4)), VoiceSelection::generic());
        assert_eq!(select_voice(&ctx, &mixed(5)), VoiceSelection::combined("voice-all"));
    }

    #[test]
    fn test_no_cloned_voices_always_generic() {
        let catalog: Vec<VoiceRecording> = (1..=20)
            .map(|i| rec(i, RecordingCategory::Emotion, "joy", None))
            .collect();
        let ctx = joy_context().with_sound("rain").with_modulation("calm");
        assert_eq!(select_voice(&ctx, &catalog), VoiceSelection::generic());
        assert_eq!(select_voice(&ctx, &[]), VoiceSelection::generic());
    }

    #[test]
    fn test_majority_tie_break_independent_of_order() {
        let mut catalog = vec![
            rec(9, RecordingCategory::Sound, "a", Some("voice-b")),
            rec(4, RecordingCategory::Emotion, "b", Some("voice-a")),
            rec(12, RecordingCategory::Modulation, "c", Some("voice-b")),
            rec(2, RecordingCategory::Emotion, "d", Some("voice-a")),
            rec(30, RecordingCategory::Sound, "e", Some("voice-c")),
        ];
        let ctx = SegmentContext::default();
        let forward = select_voice(&ctx, &catalog);
        catalog.reverse();
        let backward = select_voice(&ctx, &catalog);

        // voice-a 与 voice-b 各 2 票，voice-a 的最早录音 ID 为 2
        assert_eq!(forward, VoiceSelection::combined("voice-a"));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_majority_prefers_higher_count() {
        let catalog = vec![
            rec(1, RecordingCategory::Emotion, "a", Some("voice-x")),
            rec(2, RecordingCategory::Emotion, "b", Some("voice-y")),
            rec(3, RecordingCategory::Emotion, "c", Some("voice-y")),
        ];
        let ctx = joy_context();
        assert_eq!(
            select_voice(&ctx, &catalog),
            VoiceSelection::category("voice-y", RecordingCategory::Emotion)
        );
    }

    #[test]
    fn test_custom_policy() {
        let policy = SelectionPolicy {
            individual_min: 2,
            ..Default::default()
        };
        let selection = select_voice_with(&policy, &joy_context(), &joy_recordings(2));
        assert_eq!(selection.selection_type, VoiceSelectionType::IndividualEmotion);
    }
}
