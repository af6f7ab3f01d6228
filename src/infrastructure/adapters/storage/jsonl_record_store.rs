//! JSONL Record Store - 只追加的记录文件
//!
//! 实现 RecordStorePort trait。每条记录占一行，写入后立即刷盘，
//! 任务中途失败时已写入的记录仍然完整可读。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::application::ports::{PersistenceError, RecordStorePort};
use crate::domain::extraction::Record;

/// JSONL 记录存储
pub struct JsonlRecordStore {
    path: PathBuf,
    /// 串行化写入，保证行不交错
    write_lock: Mutex<()>,
}

impl JsonlRecordStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl RecordStorePort for JsonlRecordStore {
    async fn append(&self, record: &Record) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistenceError::IoError(e.to_string()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| PersistenceError::IoError(e.to_string()))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| PersistenceError::IoError(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| PersistenceError::IoError(e.to_string()))?;

        tracing::debug!(id = record.id, path = %self.path.display(), "Record appended");
        Ok(())
    }
}
