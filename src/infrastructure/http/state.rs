//! Application State
//!
//! 包含端口与 Command/Query Handlers

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CancelExtractionHandler, StartExtractionHandler,
    // Query handlers
    GetJobStatusHandler, ListNovelFilesHandler,
    // Ports
    JobLogPort, JobManagerPort, NovelLibraryPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub job_manager: Arc<dyn JobManagerPort>,
    pub job_log: Arc<dyn JobLogPort>,

    // ========== Command Handlers ==========
    pub start_extraction_handler: StartExtractionHandler,
    pub cancel_extraction_handler: CancelExtractionHandler,

    // ========== Query Handlers ==========
    pub list_files_handler: ListNovelFilesHandler,
    pub job_status_handler: GetJobStatusHandler,
}

impl AppState {
    /// 创建应用状态
    ///
    /// `extension` 为可处理的小说文件扩展名（不含点）
    pub fn new(
        job_manager: Arc<dyn JobManagerPort>,
        library: Arc<dyn NovelLibraryPort>,
        job_log: Arc<dyn JobLogPort>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            // Ports
            job_manager: job_manager.clone(),
            job_log,

            // Command handlers
            start_extraction_handler: StartExtractionHandler::new(
                job_manager.clone(),
                library.clone(),
                extension,
            ),
            cancel_extraction_handler: CancelExtractionHandler::new(job_manager.clone()),

            // Query handlers
            list_files_handler: ListNovelFilesHandler::new(library),
            job_status_handler: GetJobStatusHandler::new(job_manager),
        }
    }
}
