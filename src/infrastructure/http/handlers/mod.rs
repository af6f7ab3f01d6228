//! HTTP Handlers

mod extraction;
mod files;
mod logs;
mod ping;

pub use extraction::*;
pub use files::*;
pub use logs::*;
pub use ping::*;
