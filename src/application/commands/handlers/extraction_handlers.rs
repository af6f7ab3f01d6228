//! Extraction Command Handlers

use std::sync::Arc;

use crate::application::commands::{CancelExtraction, StartExtraction};
use crate::application::error::ApplicationError;
use crate::application::ports::{Job, JobManagerPort, NovelLibraryPort};
use crate::domain::extraction::DEFAULT_PROMPT;
use crate::domain::novel::NovelFileName;

// ============================================================================
// StartExtraction
// ============================================================================

/// 启动响应（任务已入队，异步执行）
#[derive(Debug, Clone)]
pub struct StartExtractionResponse {
    pub job_id: String,
    pub file_name: String,
}

/// StartExtraction Handler
///
/// 顺序：校验文件名 → 检查文件存在 → 单任务互斥 → 入队。
/// 文件不存在时直接返回，不产生任何日志或输出副作用。
pub struct StartExtractionHandler {
    job_manager: Arc<dyn JobManagerPort>,
    library: Arc<dyn NovelLibraryPort>,
    extension: String,
}

impl StartExtractionHandler {
    pub fn new(
        job_manager: Arc<dyn JobManagerPort>,
        library: Arc<dyn NovelLibraryPort>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            job_manager,
            library,
            extension: extension.into(),
        }
    }

    pub async fn handle(&self, command: StartExtraction) -> Result<StartExtractionResponse, ApplicationError> {
        let file_name = NovelFileName::parse(command.file_name, &self.extension)?;

        if !self.library.exists(&file_name).await {
            return Err(ApplicationError::InputNotFound(file_name.to_string()));
        }

        let prompt = if command.prompt.trim().is_empty() {
            DEFAULT_PROMPT.to_string()
        } else {
            command.prompt
        };

        let job_id = self
            .job_manager
            .submit(Job::new(file_name.as_str(), prompt))?;

        tracing::info!(job_id = %job_id, file = %file_name, "Extraction job submitted");

        Ok(StartExtractionResponse {
            job_id,
            file_name: file_name.to_string(),
        })
    }
}

// ============================================================================
// CancelExtraction
// ============================================================================

#[derive(Debug, Clone)]
pub struct CancelExtractionResponse {
    pub job_id: String,
}

/// CancelExtraction Handler
pub struct CancelExtractionHandler {
    job_manager: Arc<dyn JobManagerPort>,
}

impl CancelExtractionHandler {
    pub fn new(job_manager: Arc<dyn JobManagerPort>) -> Self {
        Self { job_manager }
    }

    pub fn handle(&self, command: CancelExtraction) -> Result<CancelExtractionResponse, ApplicationError> {
        let job = match command.job_id {
            Some(id) => self.job_manager.get_job(&id),
            None => self.job_manager.current(),
        }
        .filter(|job| job.status.is_active())
        .ok_or_else(|| ApplicationError::not_found("Active job", "current"))?;

        self.job_manager.cancel(&job.job_id)?;

        tracing::info!(job_id = %job.job_id, "Extraction job cancellation requested");

        Ok(CancelExtractionResponse { job_id: job.job_id })
    }
}
