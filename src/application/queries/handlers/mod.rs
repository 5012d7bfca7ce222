//! Query Handlers

mod narration_handlers;
mod recording_handlers;
mod voice_handlers;

pub use narration_handlers::*;
pub use recording_handlers::*;
pub use voice_handlers::*;
