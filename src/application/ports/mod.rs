//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod embedder;
mod extractor;
mod job_log;
mod job_manager;
mod novel_library;
mod record_store;

pub use embedder::{EmbedderPort, EmbeddingError};
pub use extractor::{ExtractionError, ExtractionRequest, ExtractorPort};
pub use job_log::{JobLogError, JobLogPort, LogLine, LogStream};
pub use job_manager::{Job, JobError, JobManagerPort, JobStatus};
pub use novel_library::{LoadedNovel, NovelLibraryPort};
pub use record_store::{PersistenceError, RecordStorePort};
