//! Sled-based Story Analysis Cache
//!
//! 包装任意 StoryAnalysisPort，相同正文 + 用户的分析结果只请求一次

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{AnalysisError, StoryAnalysisPort};
use crate::domain::narration::StoryAnalysis;

/// 内部缓存条目
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InternalCacheEntry {
    analysis: StoryAnalysis,
    created_at: i64,
}

/// 缓存命中统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisCacheStats {
    pub total_entries: usize,
    pub hit_count: u64,
    pub miss_count: u64,
}

/// Sled 分析缓存
pub struct SledAnalysisCache {
    db: Db,
    inner: Arc<dyn StoryAnalysisPort>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl SledAnalysisCache {
    /// 打开缓存数据库并包装上游分析服务
    pub fn open<P: AsRef<Path>>(
        path: P,
        inner: Arc<dyn StoryAnalysisPort>,
    ) -> Result<Self, AnalysisError> {
        let db = sled::open(path.as_ref()).map_err(|e| AnalysisError::CacheError(e.to_string()))?;

        tracing::info!(
            db_path = %path.as_ref().display(),
            entries = db.len(),
            "SledAnalysisCache initialized"
        );

        Ok(Self {
            db,
            inner,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    /// 缓存 key: analysis:{md5(content)}:{user_id}
    pub fn cache_key(content: &str, user_id: &str) -> String {
        format!("analysis:{:x}:{}", md5::compute(content.as_bytes()), user_id)
    }

    fn get(&self, key: &str) -> Result<Option<StoryAnalysis>, AnalysisError> {
        match self.db.get(key) {
            Ok(Some(data)) => {
                let entry: InternalCacheEntry = bincode::deserialize(&data)
                    .map_err(|e| AnalysisError::CacheError(e.to_string()))?;
                Ok(Some(entry.analysis))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(AnalysisError::CacheError(e.to_string())),
        }
    }

    fn put(&self, key: &str, analysis: &StoryAnalysis) -> Result<(), AnalysisError> {
        let entry = InternalCacheEntry {
            analysis: analysis.clone(),
            created_at: Utc::now().timestamp(),
        };
        let bytes =
            bincode::serialize(&entry).map_err(|e| AnalysisError::CacheError(e.to_string()))?;
        self.db
            .insert(key, bytes)
            .map_err(|e| AnalysisError::CacheError(e.to_string()))?;
        Ok(())
    }

    pub fn stats(&self) -> AnalysisCacheStats {
        AnalysisCacheStats {
            total_entries: self.db.scan_prefix("analysis:").count(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), AnalysisError> {
        self.db
            .flush()
            .map_err(|e| AnalysisError::CacheError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl StoryAnalysisPort for SledAnalysisCache {
    async fn analyze(&self, content: &str, user_id: &str) -> Result<StoryAnalysis, AnalysisError> {
        let key = Self::cache_key(content, user_id);

        // 缓存读取失败不影响主流程
        match self.get(&key) {
            Ok(Some(analysis)) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(cache_key = %key, "Analysis cache hit");
                return Ok(analysis);
            }
            Ok(None) => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(cache_key = %key, error = %e, "Analysis cache read failed");
            }
        }

        let analysis = self.inner.analyze(content, user_id).await?;

        if let Err(e) = self.put(&key, &analysis) {
            tracing::warn!(cache_key = %key, error = %e, "Analysis cache write failed");
        }

        Ok(analysis)
    }
}
