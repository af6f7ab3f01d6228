//! File Log Broadcaster
//!
//! 实现 JobLogPort trait。
//!
//! 写者：同步追加到日志文件并立即刷盘，写完后通过 watch 通道发布 `(epoch, len)`。
//! 读者：每个 tail 持有自己的文件偏移，收到通知（或空闲超时）后从偏移处读到文件末尾。
//! 写者从不等待读者，慢读者只会落后，不会阻塞流水线。
//!
//! `reset` 会截断文件并递增 epoch，读者看到新 epoch 后从头读起。

use chrono::Local;
use futures_util::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::watch;

use crate::application::ports::{JobLogError, JobLogPort, LogLine, LogStream};

/// 没有收到通知时的兜底轮询间隔
pub const TAIL_IDLE_TIMEOUT: Duration = Duration::from_millis(500);

/// 写入位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LogCursor {
    /// 每次 reset 递增
    epoch: u64,
    /// 当前文件字节长度
    len: u64,
}

struct WriterState {
    file: Option<File>,
    cursor: LogCursor,
}

/// 基于文件的日志广播器
pub struct FileLogBroadcaster {
    path: PathBuf,
    writer: Mutex<WriterState>,
    notify: watch::Sender<LogCursor>,
}

impl FileLogBroadcaster {
    /// 打开（或创建）日志文件，已有内容保留
    pub fn new(path: impl AsRef<Path>) -> Result<Self, JobLogError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = open_append(&path)?;
        let len = file.metadata().map_err(io_error)?.len();
        let cursor = LogCursor { epoch: 0, len };
        let (notify, _) = watch::channel(cursor);

        Ok(Self {
            path,
            writer: Mutex::new(WriterState {
                file: Some(file),
                cursor,
            }),
            notify,
        })
    }

    fn write_line(state: &mut WriterState, path: &Path, line: &LogLine) -> Result<(), JobLogError> {
        if state.file.is_none() {
            state.file = Some(open_append(path)?);
        }
        let Some(file) = state.file.as_mut() else {
            return Err(JobLogError::IoError("log file unavailable".to_string()));
        };

        let mut bytes = line.render().into_bytes();
        bytes.push(b'\n');

        match write_and_measure(file, &bytes) {
            Ok(len) => {
                state.cursor.len = len;
                Ok(())
            }
            Err(e) => {
                // 下次写入时重新打开
                state.file = None;
                Err(io_error(e))
            }
        }
    }

    fn publish(&self, cursor: LogCursor) {
        self.notify.send_replace(cursor);
    }

    /// 从当前末尾开始的读者
    fn reader(&self) -> TailReader {
        let mut rx = self.notify.subscribe();
        let start = *rx.borrow_and_update();

        TailReader {
            path: self.path.clone(),
            epoch: start.epoch,
            offset: start.len,
            partial: Vec::new(),
            pending: VecDeque::new(),
            rx,
        }
    }
}

impl JobLogPort for FileLogBroadcaster {
    fn append(&self, message: &str) -> Result<LogLine, JobLogError> {
        let line = LogLine::new(Local::now().format("%H:%M:%S").to_string(), message);
        tracing::info!(target: "charpick::job_log", "{}", line.message);

        let mut state = self
            .writer
            .lock()
            .map_err(|_| JobLogError::IoError("log writer poisoned".to_string()))?;
        Self::write_line(&mut state, &self.path, &line)?;
        self.publish(state.cursor);

        Ok(line)
    }

    fn reset(&self, message: &str) -> Result<LogLine, JobLogError> {
        let line = LogLine::new(Local::now().format("%H:%M:%S").to_string(), message);
        tracing::info!(target: "charpick::job_log", "{}", line.message);

        let mut state = self
            .writer
            .lock()
            .map_err(|_| JobLogError::IoError("log writer poisoned".to_string()))?;

        state.file = None;
        File::create(&self.path).map_err(io_error)?;
        state.cursor = LogCursor {
            epoch: state.cursor.epoch + 1,
            len: 0,
        };
        Self::write_line(&mut state, &self.path, &line)?;
        self.publish(state.cursor);

        Ok(line)
    }

    fn tail(&self) -> LogStream {
        stream::unfold(self.reader(), |mut reader| async move {
            let line = reader.next_line().await?;
            Some((line, reader))
        })
        .boxed()
    }
}

/// 单个订阅者的读取状态
struct TailReader {
    path: PathBuf,
    epoch: u64,
    offset: u64,
    /// 尚未遇到换行的残余字节
    partial: Vec<u8>,
    pending: VecDeque<LogLine>,
    rx: watch::Receiver<LogCursor>,
}

impl TailReader {
    /// 下一行日志；广播器被释放时返回 None
    async fn next_line(&mut self) -> Option<LogLine> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }

            let cursor = *self.rx.borrow_and_update();
            if cursor.epoch != self.epoch {
                self.epoch = cursor.epoch;
                self.rewind();
            }

            self.fill().await;
            if !self.pending.is_empty() {
                continue;
            }

            match tokio::time::timeout(TAIL_IDLE_TIMEOUT, self.rx.changed()).await {
                Ok(Err(_)) => return None,
                Ok(Ok(())) | Err(_) => {}
            }
        }
    }

    /// 读取新增内容；读取期间发生 reset 时整批丢弃，下一轮从头读
    async fn fill(&mut self) {
        if let Err(e) = self.read_available().await {
            tracing::debug!(error = %e, path = %self.path.display(), "Log tail read failed");
        }
        if self.rx.borrow().epoch != self.epoch {
            self.pending.clear();
            self.rewind();
        }
    }

    fn rewind(&mut self) {
        self.offset = 0;
        self.partial.clear();
    }

    async fn read_available(&mut self) -> std::io::Result<()> {
        let mut file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        let len = file.metadata().await?.len();
        if len < self.offset {
            // 文件被外部截断
            self.rewind();
        }
        if len == self.offset {
            return Ok(());
        }

        file.seek(std::io::SeekFrom::Start(self.offset)).await?;
        let mut buf = Vec::with_capacity((len - self.offset) as usize);
        file.take(len - self.offset).read_to_end(&mut buf).await?;
        self.offset += buf.len() as u64;

        self.partial.extend_from_slice(&buf);
        while let Some(pos) = self.partial.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            if !text.trim().is_empty() {
                self.pending.push_back(LogLine::parse(&text));
            }
        }

        Ok(())
    }
}

fn write_and_measure(file: &mut File, bytes: &[u8]) -> std::io::Result<u64> {
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file.metadata()?.len())
}

fn open_append(path: &Path) -> Result<File, JobLogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)
}

fn io_error(e: std::io::Error) -> JobLogError {
    JobLogError::IoError(e.to_string())
}
