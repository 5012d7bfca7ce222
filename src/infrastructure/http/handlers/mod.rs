//! HTTP Handlers

mod narration;
mod ping;
mod recording;
mod voice;

pub use narration::*;
pub use ping::*;
pub use recording::*;
pub use voice::*;
