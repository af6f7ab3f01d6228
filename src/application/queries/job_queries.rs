//! Job Queries

/// 查询任务状态
#[derive(Debug, Clone, Default)]
pub struct GetJobStatus {
    /// 为空时返回最近的任务
    pub job_id: Option<String>,
}
