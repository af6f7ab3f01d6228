//! Charpick - 网文章节结构化提取服务
//!
//! - Domain: novel/, extraction/ (Bounded Contexts)
//! - Application: commands, queries, ports, services
//! - Infrastructure: http, memory, worker, adapters, events

use std::sync::Arc;

use charpick::application::{ExtractorPort, JobManagerPort, ResilientEmbedder};
use charpick::config::{load_config, print_config};
use charpick::infrastructure::adapters::{
    FileNovelLibrary, JsonlRecordStore, OllamaEmbedder, OllamaEmbedderConfig, OllamaExtractor,
    OllamaExtractorConfig,
};
use charpick::infrastructure::events::FileLogBroadcaster;
use charpick::infrastructure::http::{AppState, HttpServer, ServerConfig};
use charpick::infrastructure::memory::InMemoryJobManager;
use charpick::infrastructure::worker::{PipelineRunner, PipelineWorker};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},charpick={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Charpick - 网文章节结构化提取服务");
    print_config(&config);

    // 确保输出目录存在
    tokio::fs::create_dir_all(&config.storage.output_dir).await?;

    // 小说文件库
    let encoding = config
        .encoding
        .to_domain()
        .ok_or_else(|| anyhow::anyhow!("Unknown fallback encoding: {}", config.encoding.fallback))?;
    let library = Arc::new(
        FileNovelLibrary::new(&config.storage.novels_dir, &config.storage.novel_extension)
            .with_encoding(encoding)
            .with_segment(config.segment.to_domain()),
    );

    // 外部服务客户端
    let extractor = Arc::new(OllamaExtractor::new(OllamaExtractorConfig {
        base_url: config.extractor.url.clone(),
        model: config.extractor.model.clone(),
        timeout_secs: config.extractor.timeout_secs,
        max_input_chars: config.extractor.max_input_chars,
    })?);
    if !extractor.health_check().await {
        tracing::warn!(
            url = %config.extractor.url,
            "Extraction service unreachable, chapters will be written as degraded records"
        );
    }
    let embedder = Arc::new(OllamaEmbedder::new(OllamaEmbedderConfig {
        url: config.embedding.url.clone(),
        model: config.embedding.model.clone(),
        timeout_secs: config.embedding.timeout_secs,
        max_input_chars: config.embedding.max_input_chars,
    })?);
    let examples = config
        .extractor
        .load_examples()
        .map_err(|e| anyhow::anyhow!(e))?;

    // 记录存储与任务日志
    let store = Arc::new(JsonlRecordStore::new(config.storage.output_path()));
    let job_log = Arc::new(FileLogBroadcaster::new(config.storage.log_path())?);

    // 任务队列与内存任务管理器
    let (job_tx, job_rx) = mpsc::channel(16);
    let job_manager = Arc::new(InMemoryJobManager::new(job_tx));

    // 创建并启动 PipelineWorker
    let runner = PipelineRunner::new(
        library.clone(),
        extractor,
        ResilientEmbedder::new(embedder, config.embedding.dimension),
        store,
        job_log.clone(),
        job_manager.clone(),
        examples,
        &config.storage.novel_extension,
    );
    let worker = PipelineWorker::new(job_rx, Arc::new(runner));
    tokio::spawn(worker.run());

    // 创建 HTTP 服务器
    let mut server_config = ServerConfig::new(&config.server.host, config.server.port);
    if config.server.static_files.enabled {
        server_config = server_config.with_static_dir(&config.server.static_files.dir);
    }
    let state = AppState::new(
        job_manager.clone(),
        library,
        job_log,
        &config.storage.novel_extension,
    );

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭，关闭时取消正在执行的任务）
    server
        .run_with_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");

            if let Some(job) = job_manager.current().filter(|job| job.status.is_active()) {
                if let Err(e) = job_manager.cancel(&job.job_id) {
                    tracing::warn!(job_id = %job.job_id, error = %e, "Failed to cancel job");
                }
            }
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
