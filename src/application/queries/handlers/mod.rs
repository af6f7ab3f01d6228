//! Query Handlers

mod job_handlers;
mod novel_handlers;

pub use job_handlers::GetJobStatusHandler;
pub use novel_handlers::ListNovelFilesHandler;
