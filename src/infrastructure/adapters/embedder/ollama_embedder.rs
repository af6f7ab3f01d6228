//! Ollama Embedder - 调用本地向量服务
//!
//! 实现 EmbedderPort trait
//!
//! 外部 API:
//! POST http://localhost:11434/api/embed
//! Request: {"model": "...", "input": "...", "prompt": "..."}
//!
//! 不同版本的服务返回格式不同，以下均可接受：
//! - {"embeddings": [...]} 或 {"embeddings": [[...]]}
//! - {"embedding": [...]}
//! - {"data": [{"embedding": [...]}]}
//! - [...]

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::application::ports::{EmbedderPort, EmbeddingError};
use crate::domain::truncate_chars;

/// 默认提交给向量服务的最大字符数
pub const DEFAULT_EMBED_MAX_INPUT_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    /// 新版 /api/embed
    input: &'a str,
    /// 旧版 /api/embeddings
    prompt: &'a str,
}

/// Ollama 向量客户端配置
#[derive(Debug, Clone)]
pub struct OllamaEmbedderConfig {
    /// 完整的向量接口 URL
    pub url: String,
    /// 模型 ID
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 输入截断长度（字符）
    pub max_input_chars: usize,
}

impl Default for OllamaEmbedderConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/embed".to_string(),
            model: "gemma2:9b".to_string(),
            timeout_secs: 10,
            max_input_chars: DEFAULT_EMBED_MAX_INPUT_CHARS,
        }
    }
}

/// Ollama 向量客户端
pub struct OllamaEmbedder {
    client: Client,
    config: OllamaEmbedderConfig,
}

impl OllamaEmbedder {
    pub fn new(config: OllamaEmbedderConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmbedderPort for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = truncate_chars(text, self.config.max_input_chars);
        let body = EmbedRequest {
            model: &self.config.model,
            input: text,
            prompt: text,
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else {
                    EmbeddingError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::ServiceError(format!("HTTP {}", status)));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        parse_embedding(value)
    }
}

/// 从多种返回格式中取出向量
pub(crate) fn parse_embedding(value: Value) -> Result<Vec<f32>, EmbeddingError> {
    match value {
        Value::Array(_) => vector_from(value),
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return vector_from(embeddings);
            }
            if let Some(embedding) = map.remove("embedding") {
                return vector_from(embedding);
            }
            if let Some(Value::Array(data)) = map.remove("data") {
                let embedding = data
                    .into_iter()
                    .next()
                    .and_then(|mut row| row.get_mut("embedding").map(Value::take))
                    .ok_or_else(|| {
                        EmbeddingError::InvalidResponse("`data` has no embedding".to_string())
                    })?;
                return vector_from(embedding);
            }
            Err(EmbeddingError::InvalidResponse(
                "Unrecognized embedding response shape".to_string(),
            ))
        }
        other => Err(EmbeddingError::InvalidResponse(format!(
            "Unexpected embedding response: {}",
            other
        ))),
    }
}

/// 数字数组 → 向量；嵌套数组取第一行
fn vector_from(value: Value) -> Result<Vec<f32>, EmbeddingError> {
    let Value::Array(items) = value else {
        return Err(EmbeddingError::InvalidResponse("Embedding is not an array".to_string()));
    };

    if let Some(Value::Array(_)) = items.first() {
        return items
            .into_iter()
            .next()
            .map(vector_from)
            .unwrap_or_else(|| Err(EmbeddingError::InvalidResponse("Empty embedding".to_string())));
    }

    if items.is_empty() {
        return Err(EmbeddingError::InvalidResponse("Empty embedding".to_string()));
    }

    items
        .iter()
        .map(|v| {
            v.as_f64().map(|f| f as f32).ok_or_else(|| {
                EmbeddingError::InvalidResponse(format!("Non-numeric embedding value: {}", v))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_default() {
        let config = OllamaEmbedderConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_input_chars, 2000);
    }

    #[test]
    fn test_parse_embeddings_flat() {
        let v = parse_embedding(json!({"embeddings": [0.1, 0.2]})).unwrap();
        assert_eq!(v, vec![0.1, 0.2]);
    }

    #[test]
    fn test_parse_embeddings_nested() {
        let v = parse_embedding(json!({"embeddings": [[0.5, -0.5], [9.0, 9.0]]})).unwrap();
        assert_eq!(v, vec![0.5, -0.5]);
    }

    #[test]
    fn test_parse_legacy_embedding() {
        let v = parse_embedding(json!({"embedding": [1.0]})).unwrap();
        assert_eq!(v, vec![1.0]);
    }

    #[test]
    fn test_parse_openai_style() {
        let v = parse_embedding(json!({"data": [{"embedding": [0.25, 0.75]}]})).unwrap();
        assert_eq!(v, vec![0.25, 0.75]);
    }

    #[test]
    fn test_parse_bare_list() {
        let v = parse_embedding(json!([0.0, 1.0, -1.0])).unwrap();
        assert_eq!(v, vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn test_parse_rejects_unknown_shapes() {
        assert!(parse_embedding(json!({"vector": [1.0]})).is_err());
        assert!(parse_embedding(json!({"embeddings": []})).is_err());
        assert!(parse_embedding(json!({"embeddings": ["a"]})).is_err());
        assert!(parse_embedding(json!({"data": []})).is_err());
        assert!(parse_embedding(json!("nope")).is_err());
    }
}
