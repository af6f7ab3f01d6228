//! Pipeline Worker - Background Job Consumer

use std::sync::Arc;
use tokio::sync::mpsc;

use super::pipeline_runner::{JobOutcome, PipelineRunner};

/// 提取 Worker
///
/// 后台任务处理器，从队列消费任务 ID 并逐个执行。
/// 同一时刻只运行一个任务，保证输出文件只有一个写者。
pub struct PipelineWorker {
    queue_receiver: mpsc::Receiver<String>,
    runner: Arc<PipelineRunner>,
}

impl PipelineWorker {
    pub fn new(queue_receiver: mpsc::Receiver<String>, runner: Arc<PipelineRunner>) -> Self {
        Self {
            queue_receiver,
            runner,
        }
    }

    /// 启动 Worker，队列关闭后返回
    pub async fn run(mut self) {
        tracing::info!("PipelineWorker started");

        while let Some(job_id) = self.queue_receiver.recv().await {
            tracing::info!(job_id = %job_id, "Job started");

            match self.runner.run(&job_id).await {
                JobOutcome::Done { succeeded, failed } => {
                    tracing::info!(job_id = %job_id, succeeded, failed, "Job finished");
                }
                JobOutcome::Failed(error) => {
                    tracing::error!(job_id = %job_id, error = %error, "Job failed");
                }
                JobOutcome::Cancelled { processed } => {
                    tracing::info!(job_id = %job_id, processed, "Job cancelled");
                }
                JobOutcome::Skipped => {
                    tracing::debug!(job_id = %job_id, "Job skipped");
                }
            }
        }

        tracing::info!("PipelineWorker stopped");
    }
}
