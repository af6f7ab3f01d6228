//! 文本工具

/// 截取前 `max_chars` 个字符（按 Unicode 字符计，不会切断多字节字符）
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("第一章开始", 3), "第一章");
        assert_eq!(truncate_chars("短", 10), "短");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
