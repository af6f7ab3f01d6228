//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   健康检查
//! - /api/files                GET   列出小说文件
//! - /api/extraction/start     POST  启动提取任务（202，异步执行）
//! - /api/extraction/status    GET   查询任务状态
//! - /api/extraction/cancel    POST  取消任务
//! - /api/logs                 GET   SSE 实时日志
//!
//! 旧版前端兼容:
//! - /files                    GET
//! - /start-extraction         POST
//! - /logs                     GET

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .merge(legacy_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/files", get(handlers::list_files))
        .route("/logs", get(handlers::stream_logs))
        .nest("/extraction", extraction_routes())
}

/// Extraction 路由
fn extraction_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(handlers::start_extraction))
        .route("/status", get(handlers::extraction_status))
        .route("/cancel", post(handlers::cancel_extraction))
}

/// 旧版路由
fn legacy_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/files", get(handlers::legacy_list_files))
        .route("/start-extraction", post(handlers::legacy_start_extraction))
        .route("/logs", get(handlers::stream_logs))
}
