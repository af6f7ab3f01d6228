//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `CHARPICK_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `CHARPICK_SERVER__PORT=8080`
/// - `CHARPICK_EXTRACTOR__MODEL=qwen2:7b`
/// - `CHARPICK_EMBEDDING__URL=http://gpu-box:11434/api/embed`
/// - `CHARPICK_STORAGE__NOVELS_DIR=/srv/novels`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("server.static_files.enabled", false)?
        .set_default("server.static_files.dir", "frontend/dist")?
        .set_default("extractor.url", "http://localhost:11434")?
        .set_default("extractor.model", "gemma2:9b")?
        .set_default("extractor.timeout_secs", 300)?
        .set_default("extractor.max_input_chars", 3500)?
        .set_default("embedding.url", "http://localhost:11434/api/embed")?
        .set_default("embedding.model", "gemma2:9b")?
        .set_default("embedding.timeout_secs", 10)?
        .set_default("embedding.dimension", 256)?
        .set_default("embedding.max_input_chars", 2000)?
        .set_default("storage.novels_dir", "data")?
        .set_default("storage.output_dir", "output")?
        .set_default("storage.output_file", "charpick_v3_database.jsonl")?
        .set_default("storage.log_file", "process.log")?
        .set_default("storage.novel_extension", "txt")?
        .set_default("segment.chunk_size", 4000)?
        .set_default("segment.min_chapter_chars", 50)?
        .set_default("encoding.sample_bytes", 1024 * 1024)?
        .set_default("encoding.min_confidence", 0.7)?
        .set_default("encoding.fallback", "gb18030")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: CHARPICK_EXTRACTOR__URL=http://gpu-box:11434
    builder = builder.add_source(
        Environment::with_prefix("CHARPICK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.extractor.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Extractor URL cannot be empty".to_string(),
        ));
    }

    if config.embedding.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Embedding URL cannot be empty".to_string(),
        ));
    }

    if config.embedding.dimension == 0 {
        return Err(ConfigError::ValidationError(
            "Embedding dimension must be positive".to_string(),
        ));
    }

    if config.segment.chunk_size == 0 {
        return Err(ConfigError::ValidationError(
            "Chunk size must be positive".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.encoding.min_confidence) {
        return Err(ConfigError::ValidationError(format!(
            "Encoding min_confidence must be within [0, 1], got {}",
            config.encoding.min_confidence
        )));
    }

    if config.encoding.to_domain().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "Unknown fallback encoding: {}",
            config.encoding.fallback
        )));
    }

    if config.storage.novel_extension.trim_start_matches('.').is_empty() {
        return Err(ConfigError::ValidationError(
            "Novel extension cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    if config.server.static_files.enabled {
        tracing::info!("Static Files: {:?}", config.server.static_files.dir);
    }
    tracing::info!("Extractor: {} (model {})", config.extractor.url, config.extractor.model);
    tracing::info!("Extractor Timeout: {}s", config.extractor.timeout_secs);
    tracing::info!("Embedding: {} (model {})", config.embedding.url, config.embedding.model);
    tracing::info!("Embedding Dimension: {}", config.embedding.dimension);
    tracing::info!("Novels Directory: {:?}", config.storage.novels_dir);
    tracing::info!("Output File: {:?}", config.storage.output_path());
    tracing::info!("Job Log: {:?}", config.storage.log_path());
    tracing::info!(
        "Segment: chunk_size={}, min_chapter_chars={}",
        config.segment.chunk_size,
        config.segment.min_chapter_chars
    );
    tracing::info!(
        "Encoding: fallback={}, min_confidence={}",
        config.encoding.fallback,
        config.encoding.min_confidence
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_extractor_url() {
        let mut config = AppConfig::default();
        config.extractor.url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_dimension() {
        let mut config = AppConfig::default();
        config.embedding.dimension = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_confidence_out_of_range() {
        let mut config = AppConfig::default();
        config.encoding.min_confidence = 1.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_unknown_fallback() {
        let mut config = AppConfig::default();
        config.encoding.fallback = "klingon".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("charpick.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[embedding]\ndimension = 768\n\n[storage]\nnovels_dir = \"novels\"\n",
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.embedding.dimension, 768);
        assert_eq!(config.storage.novels_dir, std::path::PathBuf::from("novels"));
        assert_eq!(config.extractor.model, "gemma2:9b");
        assert_eq!(config.segment.min_chapter_chars, 50);
    }
}
