//! Novel Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NovelError {
    #[error("文件不存在: {0}")]
    NotFound(String),

    #[error("无效的文件名: {0}")]
    InvalidFileName(String),

    #[error("文件读取错误: {0}")]
    FileReadError(String),

    #[error("分章错误: {0}")]
    SegmentationError(String),
}
