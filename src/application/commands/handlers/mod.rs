//! Command Handlers

mod narration_handlers;
mod recording_handlers;
mod segment_audio;

pub use narration_handlers::*;
pub use recording_handlers::*;
pub use segment_audio::*;
