//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{Job, StartExtractionResponse};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }

    /// 成功但无数据（`data: null`）
    pub fn empty() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: None,
        }
    }
}

// ============================================================================
// Extraction DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartExtractionRequest {
    pub file_name: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct StartExtractionResponseDto {
    pub status: &'static str,
    pub job_id: String,
    pub file_name: String,
}

impl From<StartExtractionResponse> for StartExtractionResponseDto {
    fn from(r: StartExtractionResponse) -> Self {
        Self {
            status: "started",
            job_id: r.job_id,
            file_name: r.file_name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelExtractionRequest {
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelExtractionResponseDto {
    pub job_id: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job_id: String,
    pub file_name: String,
    pub status: String,
    pub chapters_total: usize,
    pub chapters_done: usize,
    pub chapters_failed: usize,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            file_name: job.file_name,
            status: job.status.as_str().to_string(),
            chapters_total: job.chapters_total,
            chapters_done: job.chapters_done,
            chapters_failed: job.chapters_failed,
            created_at: job.created_at.to_rfc3339(),
            started_at: job.started_at.map(|t| t.to_rfc3339()),
            finished_at: job.finished_at.map(|t| t.to_rfc3339()),
            error: job.error,
        }
    }
}
