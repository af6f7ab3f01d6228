//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Novel Context: 小说文件与章节
//! - Extraction Context: 提取结果、记录与降级向量
//!
//! 以及纯函数服务：编码识别、章节切分

pub mod extraction;
pub mod novel;

mod chapter_segmenter;
mod encoding;
mod text;

pub use chapter_segmenter::{
    chunk_text, heading_spans, segment_chapters, SegmentConfig, DEFAULT_CHUNK_SIZE,
    DEFAULT_MIN_CHAPTER_CHARS,
};
pub use encoding::{
    choose_encoding, decode_text, lookup_label, resolve_encoding, DecodedText, EncodingConfig,
    EncodingGuess, DEFAULT_MIN_CONFIDENCE, DEFAULT_SAMPLE_BYTES,
};
pub use text::truncate_chars;
