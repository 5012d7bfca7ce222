//! Sled 存储实现

mod analysis_cache;

pub use analysis_cache::{AnalysisCacheStats, SledAnalysisCache};
