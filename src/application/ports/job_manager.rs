//! Job Manager Port - 提取任务管理
//!
//! 定义任务管理的抽象接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Job Manager 错误
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job already running: {0}")]
    AlreadyRunning(String),

    #[error("Job queue closed")]
    QueueClosed,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已提交，等待执行
    Pending,
    /// 正在执行
    Running,
    /// 全部章节处理完毕
    Done,
    /// 分章前失败（致命错误）
    Failed,
    /// 已取消
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// 是否仍占用执行权
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

/// 提取任务
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub job_id: String,
    pub file_name: String,
    pub prompt: String,
    pub status: JobStatus,
    pub chapters_total: usize,
    pub chapters_done: usize,
    pub chapters_failed: usize,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl Job {
    pub fn new(file_name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            file_name: file_name.into(),
            prompt: prompt.into(),
            status: JobStatus::Pending,
            chapters_total: 0,
            chapters_done: 0,
            chapters_failed: 0,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            error: None,
        }
    }
}

/// Job Manager Port
///
/// 管理提取任务的生命周期，所有状态存储在内存中。
/// 同一时刻最多只有一个活跃（pending/running）任务。
pub trait JobManagerPort: Send + Sync {
    /// 提交任务到队列；已有活跃任务时返回 `AlreadyRunning`
    fn submit(&self, job: Job) -> Result<String, JobError>;

    /// 获取任务
    fn get_job(&self, job_id: &str) -> Option<Job>;

    /// 最近提交的任务
    fn current(&self) -> Option<Job>;

    /// 设置任务状态
    fn set_status(&self, job_id: &str, status: JobStatus) -> Result<(), JobError>;

    /// 设置任务失败并记录错误
    fn set_failed(&self, job_id: &str, error: String) -> Result<(), JobError>;

    /// 记录章节总数
    fn set_total(&self, job_id: &str, total: usize) -> Result<(), JobError>;

    /// 记录一个章节的处理结果
    fn record_chapter(&self, job_id: &str, succeeded: bool) -> Result<(), JobError>;

    /// 请求取消任务（章节之间生效）
    fn cancel(&self, job_id: &str) -> Result<(), JobError>;

    /// 获取任务的取消令牌
    fn cancellation_token(&self, job_id: &str) -> Option<CancellationToken>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = Job::new("神游.txt", "提取角色");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.status.is_active());
        assert_eq!(job.chapters_done, 0);
    }

    #[test]
    fn test_terminal_states() {
        for status in [JobStatus::Done, JobStatus::Failed, JobStatus::Cancelled] {
            assert!(status.is_terminal(), "{}", status.as_str());
        }
        assert!(!JobStatus::Running.is_terminal());
    }
}
