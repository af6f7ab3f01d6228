//! Pipeline Runner - 单个提取任务的执行
//!
//! 状态: 读取分章 → 逐章 (提取 → 向量化 → 追加记录) → 完成
//!
//! - 读取/分章失败是唯一的致命错误，日志带 `[FATAL]` 标记
//! - 章节内的任何失败（包括 panic）只影响该章节，循环继续
//! - 章节严格顺序处理，记录 id 与章节顺序一致
//! - 取消令牌只在章节之间检查

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::application::ports::{
    ExtractionRequest, ExtractorPort, Job, JobLogPort, JobManagerPort, JobStatus, NovelLibraryPort,
    PersistenceError, RecordStorePort,
};
use crate::application::services::{EmbeddingSource, ResilientEmbedder};
use crate::domain::extraction::{ExtractionExample, ExtractionResult, Record};
use crate::domain::novel::{Chapter, NovelFileName};

/// 任务结束方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// 全部章节处理完毕
    Done { succeeded: usize, failed: usize },
    /// 读取或分章失败
    Failed(String),
    /// 在章节之间被取消
    Cancelled { processed: usize },
    /// 任务在开始前已被取消或不存在
    Skipped,
}

pub struct PipelineRunner {
    library: Arc<dyn NovelLibraryPort>,
    extractor: Arc<dyn ExtractorPort>,
    embedder: ResilientEmbedder,
    store: Arc<dyn RecordStorePort>,
    log: Arc<dyn JobLogPort>,
    job_manager: Arc<dyn JobManagerPort>,
    examples: Vec<ExtractionExample>,
    extension: String,
}

impl PipelineRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        library: Arc<dyn NovelLibraryPort>,
        extractor: Arc<dyn ExtractorPort>,
        embedder: ResilientEmbedder,
        store: Arc<dyn RecordStorePort>,
        log: Arc<dyn JobLogPort>,
        job_manager: Arc<dyn JobManagerPort>,
        examples: Vec<ExtractionExample>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            library,
            extractor,
            embedder,
            store,
            log,
            job_manager,
            examples,
            extension: extension.into(),
        }
    }

    /// 执行一个任务直到结束
    pub async fn run(&self, job_id: &str) -> JobOutcome {
        let job = match self.job_manager.get_job(job_id) {
            Some(job) => job,
            None => {
                tracing::warn!(job_id = %job_id, "Job not found, skipping");
                return JobOutcome::Skipped;
            }
        };

        if job.status != JobStatus::Pending {
            tracing::debug!(job_id = %job_id, status = job.status.as_str(), "Job not pending, skipping");
            return JobOutcome::Skipped;
        }

        let token = self
            .job_manager
            .cancellation_token(job_id)
            .unwrap_or_default();

        // 新任务开始时清空日志，只保留最近一次任务的记录
        if let Err(e) = self
            .log
            .reset(&format!("[System] 新任务启动 - {} (job {})", job.file_name, job_id))
        {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to reset job log");
        }
        self.set_status(job_id, JobStatus::Running);
        self.log(&format!("开始任务: 处理文件 {}", job.file_name));

        let chapters = match self.load(&job).await {
            Ok(chapters) => chapters,
            Err(reason) => {
                self.log(&format!("[FATAL] 致命错误: {}", reason));
                if let Err(e) = self.job_manager.set_failed(job_id, reason.clone()) {
                    tracing::warn!(job_id = %job_id, error = %e, "Failed to mark job failed");
                }
                return JobOutcome::Failed(reason);
            }
        };

        let total = chapters.len();
        self.log(&format!("小说切分完成，共 {} 章", total));
        if let Err(e) = self.job_manager.set_total(job_id, total) {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to record chapter total");
        }

        let mut succeeded = 0;
        let mut failed = 0;

        for (i, chapter) in chapters.iter().enumerate() {
            if token.is_cancelled() {
                return self.cancelled(job_id, i, total);
            }

            self.log(&format!("正在处理: {} ({}/{})...", chapter.title(), i + 1, total));

            let outcome = AssertUnwindSafe(self.process_chapter(&job, chapter))
                .catch_unwind()
                .await;

            let ok = match outcome {
                Ok(Ok(())) => {
                    self.log(&format!("完成: {}", chapter.title()));
                    true
                }
                Ok(Err(e)) => {
                    self.log(&format!("章节处理失败: {} - {}", chapter.title(), e));
                    false
                }
                Err(panic) => {
                    self.log(&format!(
                        "章节处理失败: {} - {}",
                        chapter.title(),
                        panic_message(panic.as_ref())
                    ));
                    false
                }
            };

            if ok {
                succeeded += 1;
            } else {
                failed += 1;
                tracing::warn!(job_id = %job_id, chapter_index = chapter.index(), "Chapter failed");
            }
            if let Err(e) = self.job_manager.record_chapter(job_id, ok) {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to record chapter result");
            }
        }

        self.log(&format!(
            "所有章节提取任务已完成！成功 {} 章，失败 {} 章",
            succeeded, failed
        ));
        self.set_status(job_id, JobStatus::Done);

        JobOutcome::Done { succeeded, failed }
    }

    async fn load(&self, job: &Job) -> Result<Vec<Chapter>, String> {
        let name = NovelFileName::parse(job.file_name.as_str(), &self.extension)
            .map_err(|e| e.to_string())?;
        let loaded = self
            .library
            .load_chapters(&name)
            .await
            .map_err(|e| e.to_string())?;

        self.log(&format!(
            "文件解码完成: 编码 {} (置信度 {:.2}{}{})",
            loaded.encoding,
            loaded.confidence,
            if loaded.fell_back { "，已回退" } else { "" },
            if loaded.had_errors { "，存在无法解码的字节" } else { "" },
        ));

        Ok(loaded.chapters)
    }

    /// 单章处理：提取与向量化总能产出结果，只有追加记录会失败
    async fn process_chapter(
        &self,
        job: &Job,
        chapter: &Chapter,
    ) -> Result<(), PersistenceError> {
        let request = ExtractionRequest {
            text: chapter.extraction_text(),
            prompt: job.prompt.clone(),
            examples: self.examples.clone(),
        };

        let extraction = ExtractionResult::from_outcome(self.extractor.extract(request).await);
        if let Some(reason) = &extraction.error {
            self.log(&format!("提取失败，写入降级记录: {} - {}", chapter.title(), reason));
        }

        let input = extraction.embedding_input().to_string();
        let embedding = self.embedder.embed(&input).await;
        if let EmbeddingSource::Fallback { reason } = &embedding.source {
            self.log(&format!("向量服务不可用，使用降级向量: {}", reason));
        }

        let record = Record::new(chapter.index(), chapter.title(), extraction, embedding.vector);
        self.store.append(&record).await?;

        tracing::debug!(
            job_id = %job.job_id,
            chapter_index = chapter.index(),
            "Chapter record appended"
        );
        Ok(())
    }

    fn cancelled(&self, job_id: &str, processed: usize, total: usize) -> JobOutcome {
        self.log(&format!("任务已取消，已处理 {}/{} 章", processed, total));
        self.set_status(job_id, JobStatus::Cancelled);
        JobOutcome::Cancelled { processed }
    }

    fn set_status(&self, job_id: &str, status: JobStatus) {
        if let Err(e) = self.job_manager.set_status(job_id, status) {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to update job status");
        }
    }

    /// 写任务日志；日志失败不影响流水线
    fn log(&self, message: &str) {
        if let Err(e) = self.log.append(message) {
            tracing::warn!(error = %e, "Failed to write job log");
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        EmbedderPort, EmbeddingError, ExtractionError, JobLogError, LoadedNovel, LogLine, LogStream,
    };
    use crate::domain::extraction::{fallback_vector, Attributes, FAILURE_NOTE};
    use crate::domain::novel::NovelError;
    use crate::infrastructure::memory::InMemoryJobManager;
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct FakeLibrary {
        chapters: Option<Vec<Chapter>>,
    }

    #[async_trait]
    impl NovelLibraryPort for FakeLibrary {
        async fn list(&self) -> Result<Vec<String>, NovelError> {
            Ok(vec!["a.txt".to_string()])
        }

        async fn exists(&self, _name: &NovelFileName) -> bool {
            self.chapters.is_some()
        }

        async fn load_chapters(&self, name: &NovelFileName) -> Result<LoadedNovel, NovelError> {
            match &self.chapters {
                Some(chapters) => Ok(LoadedNovel {
                    chapters: chapters.clone(),
                    encoding: "UTF-8".to_string(),
                    confidence: 0.99,
                    fell_back: false,
                    had_errors: false,
                }),
                None => Err(NovelError::FileReadError(format!("cannot read {}", name))),
            }
        }
    }

    /// 按章节标题决定行为：含 "bad" 失败，含 "panic" 触发 panic
    struct ScriptedExtractor;

    #[async_trait]
    impl ExtractorPort for ScriptedExtractor {
        async fn extract(&self, request: ExtractionRequest) -> Result<Attributes, ExtractionError> {
            if request.text.contains("panic") {
                panic!("extractor exploded");
            }
            if request.text.contains("bad") {
                return Err(ExtractionError::Timeout);
            }
            let mut attributes = Attributes::new();
            attributes.insert("plot_summary".to_string(), json!(format!("摘要 {}", request.text.len())));
            Ok(attributes)
        }
    }

    struct DownEmbedder;

    #[async_trait]
    impl EmbedderPort for DownEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::NetworkError("connection refused".to_string()))
        }
    }

    /// 第 `fail_at` 次追加失败
    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<Record>>,
        calls: AtomicUsize,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl RecordStorePort for MemoryStore {
        async fn append(&self, record: &Record) -> Result<(), PersistenceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(call) == self.fail_at {
                return Err(PersistenceError::IoError("disk full".to_string()));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryLog {
        lines: Mutex<Vec<String>>,
        resets: AtomicUsize,
    }

    impl JobLogPort for MemoryLog {
        fn append(&self, message: &str) -> Result<LogLine, JobLogError> {
            self.lines.lock().unwrap().push(message.to_string());
            Ok(LogLine::new("00:00:00", message))
        }

        fn reset(&self, message: &str) -> Result<LogLine, JobLogError> {
            self.resets.fetch_add(1, Ordering::SeqCst);
            let mut lines = self.lines.lock().unwrap();
            lines.clear();
            lines.push(message.to_string());
            Ok(LogLine::new("00:00:00", message))
        }

        fn tail(&self) -> LogStream {
            futures_util::stream::empty().boxed()
        }
    }

    fn chapter(index: usize, title: &str) -> Chapter {
        Chapter::new(index, title, format!("{}\n正文", title)).unwrap()
    }

    struct Harness {
        runner: PipelineRunner,
        jobs: Arc<InMemoryJobManager>,
        store: Arc<MemoryStore>,
        log: Arc<MemoryLog>,
        _rx: mpsc::Receiver<String>,
    }

    fn harness(chapters: Option<Vec<Chapter>>, store: MemoryStore) -> Harness {
        let (tx, rx) = mpsc::channel(4);
        let jobs = InMemoryJobManager::new(tx).arc();
        let store = Arc::new(store);
        let log = Arc::new(MemoryLog::default());
        let runner = PipelineRunner::new(
            Arc::new(FakeLibrary { chapters }),
            Arc::new(ScriptedExtractor),
            ResilientEmbedder::new(Arc::new(DownEmbedder), 8),
            store.clone(),
            log.clone(),
            jobs.clone(),
            Vec::new(),
            "txt",
        );
        Harness {
            runner,
            jobs,
            store,
            log,
            _rx: rx,
        }
    }

    fn logged(log: &MemoryLog) -> Vec<String> {
        log.lines.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_all_chapters_produce_records_in_order() {
        let h = harness(
            Some(vec![chapter(0, "第一章"), chapter(1, "第二章 bad"), chapter(2, "第三章")]),
            MemoryStore::default(),
        );
        let job_id = h.jobs.submit(Job::new("a.txt", "提取")).unwrap();

        let outcome = h.runner.run(&job_id).await;
        assert_eq!(outcome, JobOutcome::Done { succeeded: 3, failed: 0 });

        let records = h.store.records.lock().unwrap().clone();
        let ids: Vec<usize> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        // 提取失败仍写入降级记录，向量为空
        assert_eq!(records[1].metadata["note"], json!(FAILURE_NOTE));
        assert!(records[1].vector.is_empty());

        // 向量服务不可用时使用降级向量
        let summary = records[0].metadata["plot_summary"].as_str().unwrap();
        assert_eq!(records[0].vector, fallback_vector(summary, 8));

        let job = h.jobs.get_job(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.chapters_total, 3);
        assert_eq!(job.chapters_done, 3);

        let lines = logged(&h.log);
        assert!(lines[0].contains("新任务启动"));
        assert!(lines.iter().any(|l| l.contains("(2/3)")));
        assert!(lines.last().unwrap().contains("已完成"));
    }

    #[tokio::test]
    async fn test_persistence_failure_continues_with_next_chapter() {
        let store = MemoryStore {
            fail_at: Some(0),
            ..Default::default()
        };
        let h = harness(Some(vec![chapter(0, "第一章"), chapter(1, "第二章")]), store);
        let job_id = h.jobs.submit(Job::new("a.txt", "提取")).unwrap();

        let outcome = h.runner.run(&job_id).await;
        assert_eq!(outcome, JobOutcome::Done { succeeded: 1, failed: 1 });

        let records = h.store.records.lock().unwrap().clone();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
        assert!(logged(&h.log).iter().any(|l| l.contains("章节处理失败: 第一章") && l.contains("disk full")));
        assert_eq!(h.jobs.get_job(&job_id).unwrap().chapters_failed, 1);
    }

    #[tokio::test]
    async fn test_chapter_panic_is_contained() {
        let h = harness(
            Some(vec![chapter(0, "第一章 panic"), chapter(1, "第二章")]),
            MemoryStore::default(),
        );
        let job_id = h.jobs.submit(Job::new("a.txt", "提取")).unwrap();

        let outcome = h.runner.run(&job_id).await;
        assert_eq!(outcome, JobOutcome::Done { succeeded: 1, failed: 1 });
        assert!(logged(&h.log).iter().any(|l| l.contains("extractor exploded")));
    }

    #[tokio::test]
    async fn test_load_failure_is_fatal() {
        let h = harness(None, MemoryStore::default());
        let job_id = h.jobs.submit(Job::new("a.txt", "提取")).unwrap();

        let outcome = h.runner.run(&job_id).await;
        assert!(matches!(outcome, JobOutcome::Failed(_)));

        let lines = logged(&h.log);
        assert!(lines.last().unwrap().starts_with("[FATAL]"));
        assert!(h.store.records.lock().unwrap().is_empty());

        let job = h.jobs.get_job(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.is_some());
    }

    #[tokio::test]
    async fn test_cancellation_between_chapters() {
        let h = harness(Some(vec![chapter(0, "第一章"), chapter(1, "第二章")]), MemoryStore::default());
        let job_id = h.jobs.submit(Job::new("a.txt", "提取")).unwrap();
        h.jobs.cancellation_token(&job_id).unwrap().cancel();

        let outcome = h.runner.run(&job_id).await;
        assert_eq!(outcome, JobOutcome::Cancelled { processed: 0 });
        assert!(h.store.records.lock().unwrap().is_empty());
        assert_eq!(h.jobs.get_job(&job_id).unwrap().status, JobStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_is_skipped() {
        let h = harness(Some(vec![chapter(0, "第一章")]), MemoryStore::default());
        let job_id = h.jobs.submit(Job::new("a.txt", "提取")).unwrap();
        h.jobs.cancel(&job_id).unwrap();

        assert_eq!(h.runner.run(&job_id).await, JobOutcome::Skipped);
        assert_eq!(h.log.resets.load(Ordering::SeqCst), 0);
    }
}
