//! Analysis Adapters - 故事分析服务客户端

mod http_analysis_client;

pub use http_analysis_client::{HttpAnalysisClientConfig, HttpStoryAnalysisClient};
