//! Novel Library Port - 小说文件来源

use async_trait::async_trait;

use crate::domain::novel::{Chapter, NovelError, NovelFileName};

/// 读取并分章后的小说
#[derive(Debug, Clone)]
pub struct LoadedNovel {
    pub chapters: Vec<Chapter>,
    /// 实际使用的编码名
    pub encoding: String,
    /// 检测置信度
    pub confidence: f32,
    /// 是否使用了回退编码
    pub fell_back: bool,
    /// 是否有非法字节被替换
    pub had_errors: bool,
}

/// Novel Library Port
#[async_trait]
pub trait NovelLibraryPort: Send + Sync {
    /// 列出可用的小说文件名（按名称排序）
    async fn list(&self) -> Result<Vec<String>, NovelError>;

    /// 文件是否存在
    async fn exists(&self, name: &NovelFileName) -> bool;

    /// 读取、解码并分章
    async fn load_chapters(&self, name: &NovelFileName) -> Result<LoadedNovel, NovelError>;
}
