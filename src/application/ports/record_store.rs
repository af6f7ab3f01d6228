//! Record Store Port - 结果持久化

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::extraction::Record;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Record Store Port
///
/// 只追加存储：记录写入后不会被修改或删除。
#[async_trait]
pub trait RecordStorePort: Send + Sync {
    /// 追加一条记录并立即刷盘
    async fn append(&self, record: &Record) -> Result<(), PersistenceError>;
}
