//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod analysis;
pub mod storage;
pub mod tts;

pub use analysis::*;
pub use storage::*;
pub use tts::*;
