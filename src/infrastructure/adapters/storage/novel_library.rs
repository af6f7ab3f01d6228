//! File Novel Library - 从目录读取小说文件
//!
//! 实现 NovelLibraryPort trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{LoadedNovel, NovelLibraryPort};
use crate::domain::novel::{has_extension, NovelError, NovelFileName};
use crate::domain::{decode_text, segment_chapters, EncodingConfig, SegmentConfig};

/// 文件系统小说库
pub struct FileNovelLibrary {
    novels_dir: PathBuf,
    extension: String,
    encoding: EncodingConfig,
    segment: SegmentConfig,
}

impl FileNovelLibrary {
    pub fn new(novels_dir: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        Self {
            novels_dir: novels_dir.as_ref().to_path_buf(),
            extension: extension.into(),
            encoding: EncodingConfig::default(),
            segment: SegmentConfig::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_segment(mut self, segment: SegmentConfig) -> Self {
        self.segment = segment;
        self
    }

    fn path_of(&self, name: &NovelFileName) -> PathBuf {
        self.novels_dir.join(name.as_str())
    }
}

#[async_trait]
impl NovelLibraryPort for FileNovelLibrary {
    async fn list(&self) -> Result<Vec<String>, NovelError> {
        let mut entries = match fs::read_dir(&self.novels_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.novels_dir.display(), "Novels directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(NovelError::FileReadError(e.to_string())),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| NovelError::FileReadError(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if has_extension(name, &self.extension) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    async fn exists(&self, name: &NovelFileName) -> bool {
        fs::metadata(self.path_of(name))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn load_chapters(&self, name: &NovelFileName) -> Result<LoadedNovel, NovelError> {
        let path = self.path_of(name);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NovelError::NotFound(name.to_string()));
            }
            Err(e) => return Err(NovelError::FileReadError(e.to_string())),
        };

        let encoding = self.encoding.clone();
        let segment = self.segment.clone();

        // 检测与切分都是 CPU 密集操作
        let loaded = tokio::task::spawn_blocking(move || {
            let decoded = decode_text(&bytes, &encoding);
            let chapters = segment_chapters(&decoded.text, &segment);
            LoadedNovel {
                chapters,
                encoding: decoded.encoding.name().to_string(),
                confidence: decoded.guess.confidence,
                fell_back: decoded.guess.fell_back,
                had_errors: decoded.had_errors,
            }
        })
        .await
        .map_err(|e| NovelError::SegmentationError(e.to_string()))?;

        tracing::info!(
            file = %name,
            encoding = %loaded.encoding,
            confidence = loaded.confidence,
            chapters = loaded.chapters.len(),
            "Novel loaded"
        );

        Ok(loaded)
    }
}
