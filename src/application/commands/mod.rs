//! Commands - CQRS 命令

mod extraction_commands;
pub mod handlers;

pub use extraction_commands::{CancelExtraction, StartExtraction};
