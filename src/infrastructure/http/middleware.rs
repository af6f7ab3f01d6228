//! HTTP Middleware
//!
//! 按状态码记录请求日志

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// 状态码日志中间件
///
/// 4xx 记录 warn，5xx 记录 error，附带耗时。
/// 业务错误详情已在 `ApiError::into_response()` 中记录，这里只补充请求上下文。
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::error::ApiError;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::util::ServiceExt;

    async fn accepted() -> StatusCode {
        StatusCode::ACCEPTED
    }

    async fn conflict() -> Result<StatusCode, ApiError> {
        Err(ApiError::Conflict("job-1".to_string()))
    }

    async fn internal() -> Result<StatusCode, ApiError> {
        Err(ApiError::Internal("disk full".to_string()))
    }

    fn router() -> Router {
        Router::new()
            .route("/accepted", post(accepted))
            .route("/conflict", post(conflict))
            .route("/internal", post(internal))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        assert_eq!(status_of("/accepted").await, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_client_error_passes_through() {
        assert_eq!(status_of("/conflict").await, StatusCode::CONFLICT);
        assert_eq!(status_of("/missing").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_server_error_passes_through() {
        assert_eq!(status_of("/internal").await, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
