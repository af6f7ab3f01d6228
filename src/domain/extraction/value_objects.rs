//! Extraction Context - Value Objects

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// 提取得到的属性映射（情节摘要、角色状态等，结构由提示词决定）
pub type Attributes = Map<String, Value>;

/// 降级记录中的说明文字
pub const FAILURE_NOTE: &str = "提取失败或服务不可用";

/// 用于生成向量的属性字段
pub const PLOT_SUMMARY_KEY: &str = "plot_summary";

/// 未提供提示词时使用的默认任务描述
pub const DEFAULT_PROMPT: &str = "分析以下小说章节，请提取：
1. 关键情节 (plot_summary)：用三句话总结本章核心冲突与进展。
2. 角色动态 (characters_found)：本章核心角色的状态变化。";

/// 单个章节的提取结果
///
/// 提取失败时 `attributes` 为 `{note, error}` 降级负载，`failed = true`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub attributes: Attributes,
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn succeeded(attributes: Attributes) -> Self {
        Self {
            attributes,
            failed: false,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut attributes = Attributes::new();
        attributes.insert("note".to_string(), json!(FAILURE_NOTE));
        attributes.insert("error".to_string(), json!(reason));
        Self {
            attributes,
            failed: true,
            error: Some(reason),
        }
    }

    /// 将适配器返回值转换为结果，错误转为降级负载
    pub fn from_outcome<E: std::fmt::Display>(outcome: Result<Attributes, E>) -> Self {
        match outcome {
            Ok(attributes) => Self::succeeded(attributes),
            Err(e) => Self::failed(e.to_string()),
        }
    }

    /// 生成向量的输入文本：`plot_summary` 字段（缺失或非字符串时为空）
    pub fn embedding_input(&self) -> &str {
        if self.failed {
            return "";
        }
        self.attributes
            .get(PLOT_SUMMARY_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("")
    }
}

/// 向量（固定维度或空）
pub type EmbeddingVector = Vec<f32>;

/// 持久化单元：每章一条，只追加
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 章节顺序位置
    pub id: usize,
    pub title: String,
    pub metadata: Attributes,
    pub vector: EmbeddingVector,
}

impl Record {
    pub fn new(id: usize, title: impl Into<String>, extraction: ExtractionResult, vector: EmbeddingVector) -> Self {
        Self {
            id,
            title: title.into(),
            metadata: extraction.attributes,
            vector,
        }
    }
}

/// Few-shot 示例：一段文本及期望的提取结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionExample {
    pub text: String,
    pub extraction_class: String,
    pub extraction_text: String,
    pub attributes: Value,
}

/// 内置示例：章节情节摘要 + 角色动态
pub fn default_examples() -> Vec<ExtractionExample> {
    vec![ExtractionExample {
        text: "001回：石野从小能看见别人看不见的东西，他在村口遇到了疯疯癫癫的风君子。".to_string(),
        extraction_class: "chapter_info".to_string(),
        extraction_text: "001回内容".to_string(),
        attributes: json!({
            "plot_summary": "主角石野展示通灵天赋，并在村口与关键人物风君子初次相遇。",
            "characters_found": [
                {"name": "石野", "status": "展示天赋", "secret": "拥有天生通灵能力"},
                {"name": "风君子", "status": "神秘出场", "secret": "身份不明的引导者"}
            ]
        }),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_payload() {
        let result = ExtractionResult::failed("timeout");
        assert!(result.failed);
        assert_eq!(result.attributes["note"], json!(FAILURE_NOTE));
        assert_eq!(result.attributes["error"], json!("timeout"));
        assert_eq!(result.embedding_input(), "");
    }

    #[test]
    fn test_from_outcome_error() {
        let outcome: Result<Attributes, String> = Err("connection refused".to_string());
        let result = ExtractionResult::from_outcome(outcome);
        assert!(result.failed);
        assert_eq!(result.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_embedding_input_reads_plot_summary() {
        let mut attributes = Attributes::new();
        attributes.insert(PLOT_SUMMARY_KEY.to_string(), json!("  石野入山。 "));
        let result = ExtractionResult::succeeded(attributes);
        assert_eq!(result.embedding_input(), "石野入山。");
    }

    #[test]
    fn test_embedding_input_ignores_non_string() {
        let mut attributes = Attributes::new();
        attributes.insert(PLOT_SUMMARY_KEY.to_string(), json!(["a", "b"]));
        assert_eq!(ExtractionResult::succeeded(attributes).embedding_input(), "");
    }

    #[test]
    fn test_record_serializes_fixed_fields() {
        let record = Record::new(2, "第三章", ExtractionResult::failed("boom"), vec![]);
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        for key in ["id", "title", "metadata", "vector"] {
            assert!(keys.contains(&key));
        }
        assert_eq!(value["metadata"]["error"], json!("boom"));
    }

    #[test]
    fn test_default_examples_carry_plot_summary() {
        let examples = default_examples();
        assert_eq!(examples.len(), 1);
        assert!(examples[0].attributes.get(PLOT_SUMMARY_KEY).is_some());
    }
}
