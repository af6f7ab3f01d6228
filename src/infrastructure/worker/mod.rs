//! Worker Layer - Background Job Processing
//!
//! 实现 PipelineRunner（单个任务的逐章处理）与 PipelineWorker（队列消费）

mod pipeline_runner;
mod pipeline_worker;

pub use pipeline_runner::{JobOutcome, PipelineRunner};
pub use pipeline_worker::PipelineWorker;
