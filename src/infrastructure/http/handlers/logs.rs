//! Log Stream Handler
//!
//! Server-Sent Events：每个事件对应日志文件中的一行，
//! 从订阅时刻的日志末尾开始，直到客户端断开。

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::http::state::AppState;

/// SSE keep-alive 间隔
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

pub async fn stream_logs(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Log stream subscriber connected");

    let events = state
        .job_log
        .tail()
        .map(|line| Ok(Event::default().data(line.render())));

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
