//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::JobError;
use crate::domain::novel::NovelError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 输入文件不存在（任务不会启动）
    #[error("Input not found: {0}")]
    InputNotFound(String),

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 已有任务在执行
    #[error("Job already running: {0}")]
    JobAlreadyRunning(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }
}

impl From<NovelError> for ApplicationError {
    fn from(err: NovelError) -> Self {
        match err {
            NovelError::NotFound(name) => Self::InputNotFound(name),
            NovelError::InvalidFileName(msg) => Self::ValidationError(msg),
            NovelError::FileReadError(msg) => Self::StorageError(msg),
            NovelError::SegmentationError(msg) => Self::InternalError(msg),
        }
    }
}

impl From<JobError> for ApplicationError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(id) => Self::not_found("Job", id),
            JobError::AlreadyRunning(file) => Self::JobAlreadyRunning(file),
            JobError::QueueClosed => Self::InternalError(err.to_string()),
        }
    }
}
