//! Storage Adapters - 文件系统存储

mod jsonl_record_store;
mod novel_library;

pub use jsonl_record_store::JsonlRecordStore;
pub use novel_library::FileNovelLibrary;
