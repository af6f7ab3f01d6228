//! Novel Queries

/// 列出可用小说文件
#[derive(Debug, Clone, Default)]
pub struct ListNovelFiles;
