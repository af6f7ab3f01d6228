//! Charpick - 网文章节结构化提取流水线
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 小说文件与章节
//! - Extraction Context: 提取结果、记录与降级向量
//! - 编码识别、章节切分
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Extractor, Embedder, RecordStore, NovelLibrary, JobLog, JobManager）
//! - Services: ResilientEmbedder
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + SSE 日志流
//! - Memory: JobManager 内存实现
//! - Worker: PipelineRunner / PipelineWorker 后台任务处理
//! - Adapters: Ollama 提取与向量客户端、JSONL 记录存储、小说文件库
//! - Events: 任务日志广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
