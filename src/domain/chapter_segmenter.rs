//! 章节切分器
//!
//! 将整本小说文本切分为有序章节：
//! 1. 定位第一个章节标题（如 "第一章"、"第12节"、"001回"），跳过之前的简介/前言
//! 2. 以相邻标题为界截取章节，章节之间无重叠、无间隙
//! 3. 过滤正文过短的章节（多为正文中误匹配的标题）
//! 4. 全文没有任何标题时，按固定字数分块

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use super::novel::Chapter;

/// 默认分块字数（无章节标题时）
pub const DEFAULT_CHUNK_SIZE: usize = 4000;

/// 默认章节最小字数，不超过此字数的章节会被丢弃
pub const DEFAULT_MIN_CHAPTER_CHARS: usize = 50;

const FALLBACK_TITLE: &str = "章节";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{3}回|第[一二三四五六七八九十百千万零〇两\d]+[章节回]")
        .expect("chapter heading regex compiles")
});

/// 分章配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// 无标题时的分块字数
    pub chunk_size: usize,
    /// 章节最小字数（trim 后字数 <= 此值的章节被丢弃）
    pub min_chapter_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_chapter_chars: DEFAULT_MIN_CHAPTER_CHARS,
        }
    }
}

/// 按章节标题计算原始片段（字节区间）
///
/// 第一个片段从第一个标题开始，每个片段延伸到下一个标题之前（或文本末尾）。
/// 所有片段首尾相接，拼接后恰好等于 `text[第一个标题..]`。
/// 没有标题时返回空列表。
pub fn heading_spans(text: &str) -> Vec<Range<usize>> {
    let starts: Vec<usize> = HEADING_RE.find_iter(text).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            start..end
        })
        .collect()
}

/// 对整本小说进行分章
///
/// 空文本返回空列表；非空文本至少返回一个章节。
pub fn segment_chapters(text: &str, config: &SegmentConfig) -> Vec<Chapter> {
    if text.is_empty() {
        return Vec::new();
    }

    let spans = heading_spans(text);
    if spans.is_empty() {
        tracing::debug!(chunk_size = config.chunk_size, "No chapter headings found, chunking");
        return chunk_text(text, config.chunk_size);
    }

    let mut chapters = Vec::with_capacity(spans.len());
    let mut dropped = 0usize;

    for span in spans {
        let content = text[span].trim();
        if content.chars().count() <= config.min_chapter_chars {
            dropped += 1;
            continue;
        }

        if let Ok(chapter) = Chapter::new(chapters.len(), first_line_title(content), content) {
            chapters.push(chapter);
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, kept = chapters.len(), "Short chapters dropped");
    }

    // 所有章节都被过滤时退化为分块，保证非空输入不会得到空结果
    if chapters.is_empty() {
        return chunk_text(text, config.chunk_size);
    }

    chapters
}

/// 按固定字数分块，标题为 "Chunk N"（从 1 开始）
///
/// 按 Unicode 字符计数；分块首尾相接，最后一块可能不足 `chunk_size`。
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<Chapter> {
    let chunk_size = chunk_size.max(1);
    let mut chapters = Vec::new();
    let mut start = 0usize;
    let mut count = 0usize;

    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            push_chunk(&mut chapters, &text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        push_chunk(&mut chapters, &text[start..]);
    }

    chapters
}

fn push_chunk(chapters: &mut Vec<Chapter>, piece: &str) {
    let index = chapters.len();
    if let Ok(chapter) = Chapter::new(index, format!("Chunk {}", index + 1), piece) {
        chapters.push(chapter);
    }
}

/// 标题只取第一行（标题可能带有跨行装饰）
fn first_line_title(content: &str) -> &str {
    content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or(FALLBACK_TITLE)
}
