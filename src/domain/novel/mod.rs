//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 小说文件名校验
//! - 章节实体

mod entities;
mod errors;
mod value_objects;

pub use entities::Chapter;
pub use errors::NovelError;
pub use value_objects::{has_extension, NovelFileName};
