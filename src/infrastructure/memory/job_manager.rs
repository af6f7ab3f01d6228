//! In-Memory Job Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{Job, JobError, JobManagerPort, JobStatus};

/// 内存任务管理器
pub struct InMemoryJobManager {
    /// job_id -> Job
    jobs: DashMap<String, Job>,
    /// job_id -> 取消令牌
    tokens: DashMap<String, CancellationToken>,
    /// 最近提交的任务，同时作为提交锁
    current: Mutex<Option<String>>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<String>,
}

impl InMemoryJobManager {
    pub fn new(queue_sender: mpsc::Sender<String>) -> Self {
        Self {
            jobs: DashMap::new(),
            tokens: DashMap::new(),
            current: Mutex::new(None),
            queue_sender,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn update<F>(&self, job_id: &str, f: F) -> Result<(), JobError>
    where
        F: FnOnce(&mut Job),
    {
        let mut job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        f(&mut job);
        Ok(())
    }

    /// 清理已结束的任务，保留 `keep`（上一个任务的最终状态仍可查询）
    fn prune_finished(&self, keep: Option<&str>) {
        self.jobs
            .retain(|id, job| Some(id.as_str()) == keep || !job.status.is_terminal());
        self.tokens.retain(|id, _| self.jobs.contains_key(id));
    }

    fn current_id(&self) -> Option<String> {
        self.current.lock().ok().and_then(|c| c.clone())
    }
}

impl JobManagerPort for InMemoryJobManager {
    fn submit(&self, job: Job) -> Result<String, JobError> {
        let mut current = self.current.lock().map_err(|_| JobError::QueueClosed)?;

        if let Some(active_id) = current.as_ref() {
            let active = self
                .jobs
                .get(active_id)
                .map(|j| j.status.is_active())
                .unwrap_or(false);
            if active {
                return Err(JobError::AlreadyRunning(active_id.clone()));
            }
        }

        self.prune_finished(current.as_deref());

        let job_id = job.job_id.clone();
        self.jobs.insert(job_id.clone(), job);
        self.tokens.insert(job_id.clone(), CancellationToken::new());

        if let Err(e) = self.queue_sender.try_send(job_id.clone()) {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to enqueue job");
            self.jobs.remove(&job_id);
            self.tokens.remove(&job_id);
            return Err(JobError::QueueClosed);
        }

        *current = Some(job_id.clone());
        tracing::debug!(job_id = %job_id, "Job submitted");
        Ok(job_id)
    }

    fn get_job(&self, job_id: &str) -> Option<Job> {
        self.jobs.get(job_id).map(|j| j.clone())
    }

    fn current(&self) -> Option<Job> {
        self.current_id().and_then(|id| self.get_job(&id))
    }

    fn set_status(&self, job_id: &str, status: JobStatus) -> Result<(), JobError> {
        self.update(job_id, |job| {
            let old_status = job.status;
            job.status = status;

            match status {
                JobStatus::Running => job.started_at = Some(Utc::now()),
                s if s.is_terminal() => job.finished_at = Some(Utc::now()),
                _ => {}
            }

            tracing::debug!(
                job_id = %job_id,
                old_status = ?old_status,
                new_status = ?status,
                "Job status changed"
            );
        })
    }

    fn set_failed(&self, job_id: &str, error: String) -> Result<(), JobError> {
        self.update(job_id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error);
            job.finished_at = Some(Utc::now());
        })
    }

    fn set_total(&self, job_id: &str, total: usize) -> Result<(), JobError> {
        self.update(job_id, |job| job.chapters_total = total)
    }

    fn record_chapter(&self, job_id: &str, succeeded: bool) -> Result<(), JobError> {
        self.update(job_id, |job| {
            if succeeded {
                job.chapters_done += 1;
            } else {
                job.chapters_failed += 1;
            }
        })
    }

    fn cancel(&self, job_id: &str) -> Result<(), JobError> {
        let token = self
            .tokens
            .get(job_id)
            .map(|t| t.clone())
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        token.cancel();

        // 尚未开始的任务直接结束，运行中的任务由执行方在章节之间收尾
        self.update(job_id, |job| {
            if job.status == JobStatus::Pending {
                job.status = JobStatus::Cancelled;
                job.finished_at = Some(Utc::now());
            }
        })?;

        tracing::info!(job_id = %job_id, "Job cancellation requested");
        Ok(())
    }

    fn cancellation_token(&self, job_id: &str) -> Option<CancellationToken> {
        self.tokens.get(job_id).map(|t| t.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(capacity: usize) -> (InMemoryJobManager, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (InMemoryJobManager::new(tx), rx)
    }

    #[tokio::test]
    async fn test_submit_enqueues_job() {
        let (manager, mut rx) = manager(4);
        let job_id = manager.submit(Job::new("a.txt", "p")).unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some(job_id.as_str()));
        assert_eq!(manager.current().unwrap().job_id, job_id);
        assert!(manager.cancellation_token(&job_id).is_some());
    }

    #[test]
    fn test_second_submit_rejected_while_active() {
        let (manager, _rx) = manager(4);
        let first = manager.submit(Job::new("a.txt", "p")).unwrap();
        manager.set_status(&first, JobStatus::Running).unwrap();

        let result = manager.submit(Job::new("b.txt", "p"));
        assert!(matches!(result, Err(JobError::AlreadyRunning(id)) if id == first));
    }

    #[test]
    fn test_finished_jobs_pruned_on_submit() {
        let (manager, _rx) = manager(4);
        let first = manager.submit(Job::new("a.txt", "p")).unwrap();
        manager.set_status(&first, JobStatus::Done).unwrap();
        let second = manager.submit(Job::new("b.txt", "p")).unwrap();
        manager.set_failed(&second, "boom".to_string()).unwrap();

        let third = manager.submit(Job::new("c.txt", "p")).unwrap();

        assert!(manager.get_job(&first).is_none());
        assert!(manager.cancellation_token(&first).is_none());
        assert_eq!(manager.get_job(&second).unwrap().status, JobStatus::Failed);
        assert_eq!(manager.current().unwrap().job_id, third);
        assert_eq!(manager.jobs.len(), 2);
        assert_eq!(manager.tokens.len(), 2);
    }

    #[test]
    fn test_submit_allowed_after_terminal() {
        let (manager, _rx) = manager(4);
        let first = manager.submit(Job::new("a.txt", "p")).unwrap();
        manager.set_status(&first, JobStatus::Done).unwrap();

        let second = manager.submit(Job::new("b.txt", "p")).unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.current().unwrap().file_name, "b.txt");
        assert_eq!(manager.get_job(&first).unwrap().status, JobStatus::Done);
    }

    #[test]
    fn test_closed_queue_rejects_and_forgets_job() {
        let (manager, rx) = manager(1);
        drop(rx);
        let result = manager.submit(Job::new("a.txt", "p"));
        assert!(matches!(result, Err(JobError::QueueClosed)));
        assert!(manager.current().is_none());
    }

    #[test]
    fn test_chapter_counters() {
        let (manager, _rx) = manager(4);
        let id = manager.submit(Job::new("a.txt", "p")).unwrap();
        manager.set_total(&id, 3).unwrap();
        manager.record_chapter(&id, true).unwrap();
        manager.record_chapter(&id, false).unwrap();

        let job = manager.get_job(&id).unwrap();
        assert_eq!(job.chapters_total, 3);
        assert_eq!(job.chapters_done, 1);
        assert_eq!(job.chapters_failed, 1);
    }

    #[test]
    fn test_cancel_pending_job() {
        let (manager, _rx) = manager(4);
        let id = manager.submit(Job::new("a.txt", "p")).unwrap();
        manager.cancel(&id).unwrap();

        let job = manager.get_job(&id).unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert!(job.finished_at.is_some());
        assert!(manager.cancellation_token(&id).unwrap().is_cancelled());
    }

    #[test]
    fn test_cancel_running_job_only_signals() {
        let (manager, _rx) = manager(4);
        let id = manager.submit(Job::new("a.txt", "p")).unwrap();
        manager.set_status(&id, JobStatus::Running).unwrap();
        manager.cancel(&id).unwrap();

        assert_eq!(manager.get_job(&id).unwrap().status, JobStatus::Running);
        assert!(manager.cancellation_token(&id).unwrap().is_cancelled());
    }

    #[test]
    fn test_unknown_job() {
        let (manager, _rx) = manager(4);
        assert!(matches!(manager.cancel("nope"), Err(JobError::NotFound(_))));
        assert!(matches!(manager.set_total("nope", 1), Err(JobError::NotFound(_))));
    }

    #[test]
    fn test_set_failed_records_error() {
        let (manager, _rx) = manager(4);
        let id = manager.submit(Job::new("a.txt", "p")).unwrap();
        manager.set_failed(&id, "decode".to_string()).unwrap();

        let job = manager.get_job(&id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("decode"));
        assert!(!job.status.is_active());
    }
}
