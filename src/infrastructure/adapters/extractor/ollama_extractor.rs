//! Ollama Extractor - 调用本地 Ollama 进行结构化提取
//!
//! 实现 ExtractorPort trait
//!
//! 外部 API:
//! POST http://localhost:11434/api/generate
//! Request: {"model": "...", "prompt": "...", "format": "json", "stream": false}
//! Response: {"response": "<模型输出的 JSON 字符串>", ...}
//!
//! 模型输出约定: {"extractions": [{"extraction_class", "extraction_text", "attributes": {...}}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::application::ports::{ExtractionError, ExtractionRequest, ExtractorPort};
use crate::domain::extraction::{Attributes, ExtractionExample};
use crate::domain::truncate_chars;

/// 默认提交给模型的最大字符数
pub const DEFAULT_MAX_INPUT_CHARS: usize = 3500;

/// Ollama generate 请求体
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    format: &'static str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ModelOutput {
    extractions: Option<Vec<ModelExtraction>>,
}

#[derive(Debug, Deserialize)]
struct ModelExtraction {
    #[serde(default)]
    attributes: Value,
}

/// Ollama 提取客户端配置
#[derive(Debug, Clone)]
pub struct OllamaExtractorConfig {
    /// Ollama 服务基础 URL
    pub base_url: String,
    /// 模型 ID
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 章节文本截断长度（字符）
    pub max_input_chars: usize,
}

impl Default for OllamaExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "gemma2:9b".to_string(),
            timeout_secs: 300,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl OllamaExtractorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Ollama 提取客户端
pub struct OllamaExtractor {
    client: Client,
    config: OllamaExtractorConfig,
}

impl OllamaExtractor {
    pub fn new(config: OllamaExtractorConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ExtractorPort for OllamaExtractor {
    async fn extract(&self, request: ExtractionRequest) -> Result<Attributes, ExtractionError> {
        let text = truncate_chars(&request.text, self.config.max_input_chars);
        let body = GenerateRequest {
            model: &self.config.model,
            prompt: build_prompt(&request.prompt, &request.examples, text),
            format: "json",
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };

        tracing::debug!(
            url = %self.generate_url(),
            model = %self.config.model,
            text_chars = text.chars().count(),
            "Sending extraction request"
        );

        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Timeout
                } else if e.is_connect() {
                    ExtractionError::NetworkError(format!("Cannot connect to extraction service: {}", e))
                } else {
                    ExtractionError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ExtractionError::Timeout
            } else {
                ExtractionError::InvalidResponse(e.to_string())
            }
        })?;

        parse_model_output(&generated.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.tags_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// 组装提示词：任务描述 + 输出格式 + few-shot 示例 + 待分析文本
pub(crate) fn build_prompt(task: &str, examples: &[ExtractionExample], text: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(task.trim());
    prompt.push_str("\n\n请只输出 JSON，格式为：\n");
    prompt.push_str(
        r#"{"extractions": [{"extraction_class": "...", "extraction_text": "...", "attributes": {...}}]}"#,
    );
    prompt.push('\n');

    for (i, example) in examples.iter().enumerate() {
        let output = json!({
            "extractions": [{
                "extraction_class": example.extraction_class,
                "extraction_text": example.extraction_text,
                "attributes": example.attributes,
            }]
        });
        prompt.push_str(&format!(
            "\n示例 {}：\n输入：{}\n输出：{}\n",
            i + 1,
            example.text,
            output
        ));
    }

    prompt.push_str("\n待分析文本：\n");
    prompt.push_str(text);
    prompt
}

/// 解析模型输出，取第一个提取项的属性
pub(crate) fn parse_model_output(raw: &str) -> Result<Attributes, ExtractionError> {
    let output: ModelOutput = serde_json::from_str(raw.trim())
        .map_err(|e| ExtractionError::InvalidResponse(format!("Model output is not JSON: {}", e)))?;

    let extractions = output.extractions.ok_or_else(|| {
        ExtractionError::InvalidResponse("Model output has no `extractions` field".to_string())
    })?;

    match extractions.into_iter().next() {
        None => Ok(Attributes::new()),
        Some(first) => match first.attributes {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Attributes::new()),
            other => Err(ExtractionError::InvalidResponse(format!(
                "Extraction attributes must be an object, got: {}",
                other
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::default_examples;

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let extractor = OllamaExtractor::new(
            OllamaExtractorConfig::new("http://127.0.0.1:1").with_timeout(2),
        )
        .unwrap();
        assert!(!extractor.health_check().await);
    }

    #[test]
    fn test_config_default() {
        let config = OllamaExtractorConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.max_input_chars, 3500);
    }

    #[test]
    fn test_config_builder() {
        let config = OllamaExtractorConfig::new("http://gpu-box:11434")
            .with_model("qwen2:7b")
            .with_timeout(60);
        assert_eq!(config.base_url, "http://gpu-box:11434");
        assert_eq!(config.model, "qwen2:7b");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_generate_url_trims_slash() {
        let extractor = OllamaExtractor::new(OllamaExtractorConfig::new("http://host:1/")).unwrap();
        assert_eq!(extractor.generate_url(), "http://host:1/api/generate");
    }

    #[test]
    fn test_prompt_contains_examples_and_text() {
        let prompt = build_prompt("提取角色", &default_examples(), "第一章 开始\n正文");
        assert!(prompt.starts_with("提取角色"));
        assert!(prompt.contains("示例 1："));
        assert!(prompt.contains("风君子"));
        assert!(prompt.ends_with("第一章 开始\n正文"));
    }

    #[test]
    fn test_parse_first_extraction() {
        let raw = r#"{"extractions": [
            {"extraction_class": "chapter_info", "extraction_text": "x", "attributes": {"plot_summary": "甲"}},
            {"extraction_class": "chapter_info", "extraction_text": "y", "attributes": {"plot_summary": "乙"}}
        ]}"#;
        let attributes = parse_model_output(raw).unwrap();
        assert_eq!(attributes["plot_summary"], json!("甲"));
    }

    #[test]
    fn test_parse_zero_extractions_is_empty() {
        let attributes = parse_model_output(r#"{"extractions": []}"#).unwrap();
        assert!(attributes.is_empty());
    }

    #[test]
    fn test_parse_malformed_is_error() {
        assert!(matches!(
            parse_model_output("not json"),
            Err(ExtractionError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_model_output(r#"{"plot_summary": "甲"}"#),
            Err(ExtractionError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_model_output(r#"{"extractions": [{"attributes": "甲"}]}"#),
            Err(ExtractionError::InvalidResponse(_))
        ));
    }
}
