//! Novel Context - Entities

use serde::{Deserialize, Serialize};

use super::errors::NovelError;

/// 章节 - 最小提取单位
///
/// 不变量:
/// - index 为章节在源文件中的顺序位置，从 0 开始
/// - content 不可为空
/// - 创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    index: usize,
    title: String,
    content: String,
}

impl Chapter {
    pub fn new(
        index: usize,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, NovelError> {
        let content = content.into();
        if content.is_empty() {
            return Err(NovelError::SegmentationError(format!(
                "第 {} 章内容为空",
                index + 1
            )));
        }
        Ok(Self {
            index,
            title: title.into(),
            content,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// 内容字符数（按 Unicode 字符计）
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// 提交给提取服务的文本：标题 + 换行 + 正文
    pub fn extraction_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_rejected() {
        let err = Chapter::new(0, "第一章", "").unwrap_err();
        assert!(matches!(err, NovelError::SegmentationError(_)));
        assert_eq!(err.to_string(), "分章错误: 第 1 章内容为空");
    }

    #[test]
    fn test_extraction_text_prefixes_title() {
        let chapter = Chapter::new(3, "第四章 夜行", "正文").unwrap();
        assert_eq!(chapter.index(), 3);
        assert_eq!(chapter.extraction_text(), "第四章 夜行\n正文");
        assert_eq!(chapter.char_count(), 2);
    }
}
