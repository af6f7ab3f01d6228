//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::extraction::{default_examples, ExtractionExample};
use crate::domain::lookup_label;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 结构化提取服务配置
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// 向量服务配置
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 分章配置
    #[serde(default)]
    pub segment: SegmentConfig,

    /// 编码识别配置
    #[serde(default)]
    pub encoding: EncodingConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default)]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend/dist")
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 结构化提取服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// Ollama 服务基础 URL
    #[serde(default = "default_ollama_url")]
    pub url: String,

    /// 模型 ID
    #[serde(default = "default_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_extractor_timeout")]
    pub timeout_secs: u64,

    /// 章节文本截断长度（字符）
    #[serde(default = "default_extractor_max_chars")]
    pub max_input_chars: usize,

    /// Few-shot 示例 JSON 文件；未设置时使用内置示例
    #[serde(default)]
    pub examples_path: Option<PathBuf>,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gemma2:9b".to_string()
}

fn default_extractor_timeout() -> u64 {
    300
}

fn default_extractor_max_chars() -> usize {
    3500
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_model(),
            timeout_secs: default_extractor_timeout(),
            max_input_chars: default_extractor_max_chars(),
            examples_path: None,
        }
    }
}

impl ExtractorConfig {
    /// 读取 few-shot 示例；未配置文件时返回内置示例
    pub fn load_examples(&self) -> Result<Vec<ExtractionExample>, String> {
        let Some(path) = &self.examples_path else {
            return Ok(default_examples());
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read examples file {:?}: {}", path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid examples file {:?}: {}", path, e))
    }
}

/// 向量服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// 完整的向量接口 URL
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// 模型 ID
    #[serde(default = "default_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// 向量维度（降级向量同样使用此维度）
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// 输入截断长度（字符）
    #[serde(default = "default_embedding_max_chars")]
    pub max_input_chars: usize,
}

fn default_embedding_url() -> String {
    "http://localhost:11434/api/embed".to_string()
}

fn default_embedding_timeout() -> u64 {
    10
}

fn default_dimension() -> usize {
    256
}

fn default_embedding_max_chars() -> usize {
    2000
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_model(),
            timeout_secs: default_embedding_timeout(),
            dimension: default_dimension(),
            max_input_chars: default_embedding_max_chars(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 小说 TXT 文件目录
    #[serde(default = "default_novels_dir")]
    pub novels_dir: PathBuf,

    /// 输出目录（记录文件与任务日志）
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 记录文件名
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// 任务日志文件名
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// 小说文件扩展名（不含点）
    #[serde(default = "default_novel_extension")]
    pub novel_extension: String,
}

fn default_novels_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_output_file() -> String {
    "charpick_v3_database.jsonl".to_string()
}

fn default_log_file() -> String {
    "process.log".to_string()
}

fn default_novel_extension() -> String {
    "txt".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            novels_dir: default_novels_dir(),
            output_dir: default_output_dir(),
            output_file: default_output_file(),
            log_file: default_log_file(),
            novel_extension: default_novel_extension(),
        }
    }
}

impl StorageConfig {
    /// 记录文件完整路径
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    /// 任务日志完整路径
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file)
    }
}

/// 分章配置
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentConfig {
    /// 无章节标题时的分块字数
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// 章节最小字数
    #[serde(default = "default_min_chapter_chars")]
    pub min_chapter_chars: usize,
}

fn default_chunk_size() -> usize {
    crate::domain::DEFAULT_CHUNK_SIZE
}

fn default_min_chapter_chars() -> usize {
    crate::domain::DEFAULT_MIN_CHAPTER_CHARS
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            min_chapter_chars: default_min_chapter_chars(),
        }
    }
}

impl SegmentConfig {
    pub fn to_domain(&self) -> crate::domain::SegmentConfig {
        crate::domain::SegmentConfig {
            chunk_size: self.chunk_size,
            min_chapter_chars: self.min_chapter_chars,
        }
    }
}

/// 编码识别配置
#[derive(Debug, Clone, Deserialize)]
pub struct EncodingConfig {
    /// 用于检测的最大字节数
    #[serde(default = "default_sample_bytes")]
    pub sample_bytes: usize,

    /// 最低置信度
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// 检测不可信时使用的编码标签
    #[serde(default = "default_fallback_encoding")]
    pub fallback: String,
}

fn default_sample_bytes() -> usize {
    crate::domain::DEFAULT_SAMPLE_BYTES
}

fn default_min_confidence() -> f32 {
    crate::domain::DEFAULT_MIN_CONFIDENCE
}

fn default_fallback_encoding() -> String {
    "gb18030".to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            sample_bytes: default_sample_bytes(),
            min_confidence: default_min_confidence(),
            fallback: default_fallback_encoding(),
        }
    }
}

impl EncodingConfig {
    /// 转换为领域配置；回退编码标签无法识别时返回 None
    pub fn to_domain(&self) -> Option<crate::domain::EncodingConfig> {
        Some(crate::domain::EncodingConfig {
            sample_bytes: self.sample_bytes,
            min_confidence: self.min_confidence,
            fallback: lookup_label(&self.fallback)?,
        })
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
