//! Ping Handler
//!
//! 健康检查，顺带返回当前活跃任务

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// 正在排队或执行的任务
    pub active_job: Option<String>,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    let active_job = state
        .job_manager
        .current()
        .filter(|job| job.status.is_active())
        .map(|job| job.job_id);

    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_job,
    })
}
