//! 旁白生成结果

use serde::{Deserialize, Serialize};

use super::selection::{VoiceSelection, VoiceSelectionType};

/// 全部段落失败时的错误信息
pub const NO_AUDIO_GENERATED: &str = "No audio files were generated successfully";

/// 单个段落的音频产物（生成后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAudioResult {
    pub segment_index: usize,
    pub audio_url: String,
    pub voice_type: VoiceSelectionType,
    pub voice_id: Option<String>,
    pub emotion: Option<String>,
    pub category: Option<String>,
    /// 是否复用了历史产物
    #[serde(default)]
    pub cached: bool,
}

impl SegmentAudioResult {
    pub fn new(segment_index: usize, audio_url: String, selection: &VoiceSelection, cached: bool) -> Self {
        Self {
            segment_index,
            audio_url,
            voice_type: selection.selection_type,
            voice_id: selection.voice_id.clone(),
            emotion: selection.emotion.clone(),
            category: selection.category.clone(),
            cached,
        }
    }
}

/// 一次旁白生成的汇总结果
///
/// 不变量:
/// - total_segments == 输入段落数
/// - audio_files.len() <= total_segments
/// - success == !audio_files.is_empty()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationResult {
    pub success: bool,
    pub audio_files: Vec<SegmentAudioResult>,
    pub total_segments: usize,
    pub error: Option<String>,
}

impl NarrationResult {
    /// 目录或分析获取失败：整体失败，不产出任何音频
    pub fn failed(total_segments: usize, error: impl Into<String>) -> Self {
        Self {
            success: false,
            audio_files: Vec::new(),
            total_segments,
            error: Some(error.into()),
        }
    }

    /// 失败的段落索引（按顺序）
    pub fn missing_indices(&self) -> Vec<usize> {
        (0..self.total_segments)
            .filter(|i| !self.audio_files.iter().any(|f| f.segment_index == *i))
            .collect()
    }
}

/// 结果累加器
///
/// 段落失败只记录、不终止；finish 时统一计算 success 和 error
#[derive(Debug, Clone)]
pub struct NarrationAccumulator {
    total_segments: usize,
    audio_files: Vec<SegmentAudioResult>,
    failures: Vec<(usize, String)>,
}

impl NarrationAccumulator {
    pub fn new(total_segments: usize) -> Self {
        Self {
            total_segments,
            audio_files: Vec::with_capacity(total_segments),
            failures: Vec::new(),
        }
    }

    pub fn push_success(mut self, result: SegmentAudioResult) -> Self {
        self.audio_files.push(result);
        self
    }

    pub fn push_failure(mut self, segment_index: usize, error: impl Into<String>) -> Self {
        self.failures.push((segment_index, error.into()));
        self
    }

    /// 失败的段落及原因
    pub fn failures(&self) -> &[(usize, String)] {
        &self.failures
    }

    pub fn finish(self) -> NarrationResult {
        let success = !self.audio_files.is_empty();
        NarrationResult {
            success,
            error: (!success).then(|| NO_AUDIO_GENERATED.to_string()),
            audio_files: self.audio_files,
            total_segments: self.total_segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize) -> SegmentAudioResult {
        SegmentAudioResult::new(index, format!("/audio/{}.mp3", index), &VoiceSelection::generic(), false)
    }

    #[test]
    fn test_partial_success() {
        let acc = (0..5).fold(NarrationAccumulator::new(5), |acc, i| {
            if i == 2 {
                acc.push_failure(i, "provider down")
            } else {
                acc.push_success(result(i))
            }
        });
        assert_eq!(acc.failures().len(), 1);

        let outcome = acc.finish();
        assert!(outcome.success);
        assert_eq!(outcome.audio_files.len(), 4);
        assert_eq!(outcome.total_segments, 5);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.missing_indices(), vec![2]);
    }

    #[test]
    fn test_all_failed() {
        let outcome = NarrationAccumulator::new(2)
            .push_failure(0, "a")
            .push_failure(1, "b")
            .finish();
        assert!(!outcome.success);
        assert!(outcome.audio_files.is_empty());
        assert_eq!(outcome.error.as_deref(), Some(NO_AUDIO_GENERATED));
    }

    #[test]
    fn test_empty_input_is_not_success() {
        let outcome = NarrationAccumulator::new(0).finish();
        assert!(!outcome.success);
        assert_eq!(outcome.total_segments, 0);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(result(0)).unwrap();
        assert_eq!(json["voice_type"], "generic_voice");
        assert_eq!(json["segment_index"], 0);
    }
}
