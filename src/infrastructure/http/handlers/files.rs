//! Novel File Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::ListNovelFiles;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 列出可处理的小说文件
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let files = state.list_files_handler.handle(ListNovelFiles).await?;
    Ok(Json(ApiResponse::success(files)))
}

/// 旧版前端接口：直接返回文件名数组
pub async fn legacy_list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let files = state.list_files_handler.handle(ListNovelFiles).await?;
    Ok(Json(files))
}
