//! Embedder Port - 向量服务抽象

use async_trait::async_trait;
use thiserror::Error;

/// 向量化错误
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Embedder Port
///
/// 在线向量服务。失败时由调用方决定降级策略。
#[async_trait]
pub trait EmbedderPort: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
