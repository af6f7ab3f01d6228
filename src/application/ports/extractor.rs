//! Extractor Port - 结构化提取服务抽象
//!
//! 定义章节结构化提取的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::extraction::{Attributes, ExtractionExample};

/// 提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 提取请求
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// 章节文本（标题 + 正文），适配器负责截断
    pub text: String,
    /// 任务提示词
    pub prompt: String,
    /// Few-shot 示例
    pub examples: Vec<ExtractionExample>,
}

/// Extractor Port
///
/// 外部提取服务的抽象接口。单次尝试，不重试。
#[async_trait]
pub trait ExtractorPort: Send + Sync {
    /// 提取章节属性
    ///
    /// 返回第一个提取项的属性；服务没有返回任何提取项时为空映射。
    async fn extract(&self, request: ExtractionRequest) -> Result<Attributes, ExtractionError>;

    /// 检查提取服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
