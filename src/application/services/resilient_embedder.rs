//! Resilient Embedder - 永不失败的向量化
//!
//! 包装在线 EmbedderPort：
//! - 空文本 → 空向量（不降级）
//! - 在线服务返回配置维度的向量 → 直接使用
//! - 其他任何情况（网络错误、非 2xx、格式无法识别、维度不符）→ 确定性降级向量
//!
//! 两种来源对下游不可区分，输出维度恒定。

use std::sync::Arc;

use crate::application::ports::{EmbedderPort, EmbeddingError};
use crate::domain::extraction::{fallback_vector, EmbeddingVector};

/// 向量来源（仅用于日志）
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingSource {
    /// 输入为空，未调用服务
    Skipped,
    /// 在线服务
    Live,
    /// 降级向量，附带原因
    Fallback { reason: String },
}

#[derive(Debug, Clone)]
pub struct EmbeddingOutcome {
    pub vector: EmbeddingVector,
    pub source: EmbeddingSource,
}

pub struct ResilientEmbedder {
    inner: Arc<dyn EmbedderPort>,
    dimension: usize,
}

impl ResilientEmbedder {
    pub fn new(inner: Arc<dyn EmbedderPort>, dimension: usize) -> Self {
        Self { inner, dimension }
    }

    /// 向量化（全函数，不返回错误）
    pub async fn embed(&self, text: &str) -> EmbeddingOutcome {
        if text.is_empty() {
            return EmbeddingOutcome {
                vector: Vec::new(),
                source: EmbeddingSource::Skipped,
            };
        }

        let live = self.inner.embed(text).await.and_then(|vector| {
            if vector.len() == self.dimension {
                Ok(vector)
            } else {
                Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                })
            }
        });

        match live {
            Ok(vector) => EmbeddingOutcome {
                vector,
                source: EmbeddingSource::Live,
            },
            Err(e) => {
                tracing::warn!(error = %e, dimension = self.dimension, "Embedding service unavailable, using fallback vector");
                EmbeddingOutcome {
                    vector: fallback_vector(text, self.dimension),
                    source: EmbeddingSource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}
