//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod narration_repo;
mod recording_repo;

pub use database::*;
pub use narration_repo::*;
pub use recording_repo::*;
