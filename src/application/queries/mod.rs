//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod narration_queries;
mod recording_queries;
mod voice_queries;

pub mod handlers;

pub use narration_queries::*;
pub use recording_queries::*;
pub use voice_queries::*;
