//! Queries - CQRS 查询

pub mod handlers;
mod job_queries;
mod novel_queries;

pub use job_queries::GetJobStatus;
pub use novel_queries::ListNovelFiles;
