//! Novel Context - Value Objects

use serde::{Deserialize, Serialize};

use super::NovelError;

/// 小说文件名（位于小说目录下，不含路径）
///
/// 不变量:
/// - 非空
/// - 不含路径分隔符，不是 `.` / `..`
/// - 以配置的扩展名结尾
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NovelFileName(String);

impl NovelFileName {
    pub fn parse(name: impl Into<String>, extension: &str) -> Result<Self, NovelError> {
        let name = name.into();
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(NovelError::InvalidFileName("文件名不能为空".to_string()));
        }
        if trimmed.contains('/') || trimmed.contains('\\') || trimmed.contains('\0') {
            return Err(NovelError::InvalidFileName(format!(
                "文件名不能包含路径: {}",
                trimmed
            )));
        }
        if trimmed == "." || trimmed == ".." {
            return Err(NovelError::InvalidFileName(trimmed.to_string()));
        }
        if !has_extension(trimmed, extension) {
            return Err(NovelError::InvalidFileName(format!(
                "仅支持 .{} 文件: {}",
                extension, trimmed
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NovelFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 判断文件名是否以指定扩展名结尾（忽略大小写）
pub fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
