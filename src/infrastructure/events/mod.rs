//! Events - 任务日志广播

mod log_broadcaster;

pub use log_broadcaster::{FileLogBroadcaster, TAIL_IDLE_TIMEOUT};
