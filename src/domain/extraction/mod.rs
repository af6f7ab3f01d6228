//! Extraction Context - 提取与向量化
//!
//! 职责:
//! - 提取结果（含失败降级负载）
//! - 持久化记录
//! - 降级向量

mod fallback_vector;
mod value_objects;

pub use fallback_vector::fallback_vector;
pub use value_objects::{
    default_examples, Attributes, EmbeddingVector, ExtractionExample, ExtractionResult, Record,
    DEFAULT_PROMPT, FAILURE_NOTE, PLOT_SUMMARY_KEY,
};
