//! Job Log Port - 任务日志
//!
//! 持久化的只追加日志 + 实时 tail。
//! 单写者多读者：读者各自维护读取位置，写者从不等待读者。

use futures_util::stream::BoxStream;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobLogError {
    #[error("IO error: {0}")]
    IoError(String),
}

/// 一行日志: `[HH:MM:SS] message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub timestamp: String,
    pub message: String,
}

impl LogLine {
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: single_line(message.into()),
        }
    }

    /// 解析一行日志；没有时间戳前缀时 timestamp 为空
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(rest) = line.strip_prefix('[') {
            if let Some((timestamp, message)) = rest.split_once("] ") {
                if is_clock(timestamp) {
                    return Self::new(timestamp, message);
                }
            }
        }
        Self::new("", line)
    }

    /// 渲染为日志文件中的一行（不含换行）
    pub fn render(&self) -> String {
        if self.timestamp.is_empty() {
            self.message.clone()
        } else {
            format!("[{}] {}", self.timestamp, self.message)
        }
    }
}

/// 一条消息只占一行：换行折叠为空格
fn single_line(message: String) -> String {
    if !message.contains(['\r', '\n']) {
        return message;
    }
    message
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_clock(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 8
        && bytes[2] == b':'
        && bytes[5] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit())
}

/// 日志流：从订阅时刻的日志末尾开始，无限产出新行
pub type LogStream = BoxStream<'static, LogLine>;

/// Job Log Port
pub trait JobLogPort: Send + Sync {
    /// 同步追加一行并立即刷盘
    fn append(&self, message: &str) -> Result<LogLine, JobLogError>;

    /// 清空日志并写入第一行（新任务开始时调用）
    fn reset(&self, message: &str) -> Result<LogLine, JobLogError>;

    /// 订阅新日志
    fn tail(&self) -> LogStream;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamped_line() {
        let line = LogLine::parse("[12:34:56] 完成: 第一章\n");
        assert_eq!(line.timestamp, "12:34:56");
        assert_eq!(line.message, "完成: 第一章");
        assert_eq!(line.render(), "[12:34:56] 完成: 第一章");
    }

    #[test]
    fn test_parse_plain_line() {
        let line = LogLine::parse("[System] Log stream started...");
        assert_eq!(line.timestamp, "");
        assert_eq!(line.message, "[System] Log stream started...");
        assert_eq!(line.render(), "[System] Log stream started...");
    }

    #[test]
    fn test_multiline_message_collapses() {
        let line = LogLine::new("12:00:00", "HTTP 502: <html>\r\n<body>bad gateway</body>\n");
        assert_eq!(line.message, "HTTP 502: <html> <body>bad gateway</body>");
        assert!(!line.render().contains('\n'));
    }
}
