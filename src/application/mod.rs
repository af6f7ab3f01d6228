//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Extractor、Embedder、RecordStore、NovelLibrary、JobLog、JobManager）
//! - services: 组合端口的应用服务（ResilientEmbedder）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;

// Re-exports
pub use commands::{
    handlers::{
        CancelExtractionHandler, CancelExtractionResponse, StartExtractionHandler,
        StartExtractionResponse,
    },
    CancelExtraction, StartExtraction,
};

pub use error::ApplicationError;

pub use ports::{
    // Embedder
    EmbedderPort,
    EmbeddingError,
    // Extractor
    ExtractionError,
    ExtractionRequest,
    ExtractorPort,
    // Job log
    JobLogError,
    JobLogPort,
    LogLine,
    LogStream,
    // Job manager
    Job,
    JobError,
    JobManagerPort,
    JobStatus,
    // Novel library
    LoadedNovel,
    NovelLibraryPort,
    // Record store
    PersistenceError,
    RecordStorePort,
};

pub use queries::{
    handlers::{GetJobStatusHandler, ListNovelFilesHandler},
    GetJobStatus, ListNovelFiles,
};

pub use services::{EmbeddingOutcome, EmbeddingSource, ResilientEmbedder};
