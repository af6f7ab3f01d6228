//! Extraction Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{CancelExtraction, GetJobStatus, StartExtraction};
use crate::infrastructure::http::dto::{
    ApiResponse, CancelExtractionRequest, CancelExtractionResponseDto, JobResponse,
    StartExtractionRequest, StartExtractionResponseDto,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 启动提取任务（异步执行，立即返回 202）
pub async fn start_extraction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartExtractionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StartExtractionResponseDto>>), ApiError> {
    let cmd = StartExtraction {
        file_name: req.file_name,
        prompt: req.prompt,
    };

    let result = state.start_extraction_handler.handle(cmd).await?;

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(result.into()))))
}

#[derive(Debug, Serialize)]
pub struct LegacyStartResponse {
    pub status: &'static str,
    pub job_id: String,
}

/// 旧版前端接口：返回 `{"status": "started"}`
pub async fn legacy_start_extraction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartExtractionRequest>,
) -> Result<Json<LegacyStartResponse>, ApiError> {
    let cmd = StartExtraction {
        file_name: req.file_name,
        prompt: req.prompt,
    };

    let result = state.start_extraction_handler.handle(cmd).await?;

    Ok(Json(LegacyStartResponse {
        status: "started",
        job_id: result.job_id,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct JobStatusParams {
    pub job_id: Option<String>,
}

/// 查询任务状态；未指定 job_id 时返回最近的任务（从未有任务时 data 为 null）
pub async fn extraction_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JobStatusParams>,
) -> Result<Json<ApiResponse<JobResponse>>, ApiError> {
    let query = GetJobStatus {
        job_id: params.job_id,
    };

    let response = match state.job_status_handler.handle(query)? {
        Some(job) => ApiResponse::success(job.into()),
        None => ApiResponse::empty(),
    };

    Ok(Json(response))
}

/// 取消任务（在章节之间生效）
pub async fn cancel_extraction(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CancelExtractionRequest>>,
) -> Result<Json<ApiResponse<CancelExtractionResponseDto>>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let cmd = CancelExtraction { job_id: req.job_id };

    let result = state.cancel_extraction_handler.handle(cmd)?;

    Ok(Json(ApiResponse::success(CancelExtractionResponseDto {
        job_id: result.job_id,
        status: "cancelling",
    })))
}
