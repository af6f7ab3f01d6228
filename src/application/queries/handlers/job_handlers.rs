//! Job Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{Job, JobManagerPort};
use crate::application::queries::GetJobStatus;

/// GetJobStatus Handler
pub struct GetJobStatusHandler {
    job_manager: Arc<dyn JobManagerPort>,
}

impl GetJobStatusHandler {
    pub fn new(job_manager: Arc<dyn JobManagerPort>) -> Self {
        Self { job_manager }
    }

    /// 指定 job_id 不存在时返回 NotFound；未指定且从未有任务时返回 None
    pub fn handle(&self, query: GetJobStatus) -> Result<Option<Job>, ApplicationError> {
        match query.job_id {
            Some(id) => self
                .job_manager
                .get_job(&id)
                .map(Some)
                .ok_or_else(|| ApplicationError::not_found("Job", id)),
            None => Ok(self.job_manager.current()),
        }
    }
}
