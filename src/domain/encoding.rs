//! 编码识别
//!
//! 网文 TXT 常见 GBK/GB18030/Big5/UTF-8 等多种编码。
//! 取文件前缀做统计检测，置信度不足时回退到覆盖面最广的 GB18030；
//! 解码时对非法字节做替换而不报错，少量损坏不影响整本书的处理。

use encoding_rs::{Encoding, GB18030};

/// 默认检测样本大小（1 MiB）
pub const DEFAULT_SAMPLE_BYTES: usize = 1024 * 1024;

/// 默认最低置信度，低于此值不信任检测结果
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.7;

/// 编码识别配置
#[derive(Debug, Clone)]
pub struct EncodingConfig {
    /// 用于检测的最大字节数
    pub sample_bytes: usize,
    /// 最低置信度
    pub min_confidence: f32,
    /// 检测不可信时使用的编码
    pub fallback: &'static Encoding,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            sample_bytes: DEFAULT_SAMPLE_BYTES,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            fallback: GB18030,
        }
    }
}

/// 编码检测结果
#[derive(Debug, Clone)]
pub struct EncodingGuess {
    /// 最终采用的编码
    pub encoding: &'static Encoding,
    /// 检测器给出的原始标签（可能为空）
    pub detected_label: String,
    /// 检测器给出的置信度 [0, 1]
    pub confidence: f32,
    /// 是否使用了回退编码
    pub fell_back: bool,
}

/// 解码结果
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub guess: EncodingGuess,
    /// 实际解码使用的编码（BOM 优先于检测结果）
    pub encoding: &'static Encoding,
    /// 是否存在被替换的非法字节
    pub had_errors: bool,
}

/// 对字节前缀进行编码检测
pub fn resolve_encoding(sample: &[u8], config: &EncodingConfig) -> EncodingGuess {
    let sample = &sample[..sample.len().min(config.sample_bytes)];
    let (label, confidence, _language) = chardet::detect(&sample.to_vec());
    choose_encoding(&label, confidence, config)
}

/// 根据检测标签与置信度选择编码
///
/// 标签为空、无法识别或置信度低于阈值时使用回退编码。
pub fn choose_encoding(label: &str, confidence: f32, config: &EncodingConfig) -> EncodingGuess {
    let detected = lookup_label(label).filter(|_| confidence >= config.min_confidence);

    EncodingGuess {
        encoding: detected.unwrap_or(config.fallback),
        detected_label: label.to_string(),
        confidence,
        fell_back: detected.is_none(),
    }
}

/// 检测并解码整段字节
pub fn decode_text(bytes: &[u8], config: &EncodingConfig) -> DecodedText {
    let guess = resolve_encoding(bytes, config);
    let (text, encoding, had_errors) = guess.encoding.decode(bytes);

    DecodedText {
        text: text.into_owned(),
        guess,
        encoding,
        had_errors,
    }
}

/// 检测器标签转换为 `encoding_rs` 编码
///
/// 检测器可能返回 "UTF-8-SIG" 之类的非 WHATWG 标签，去掉 `-sig` 后缀再查找。
pub fn lookup_label(label: &str) -> Option<&'static Encoding> {
    let normalized = label.trim().to_ascii_lowercase();
    let normalized = normalized.strip_suffix("-sig").unwrap_or(&normalized);
    if normalized.is_empty() {
        return None;
    }
    Encoding::for_label(normalized.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{GBK, UTF_8};

    const SAMPLE: &str = "石野从小能看见别人看不见的东西，他在村口遇到了疯疯癫癫的风君子。\
        风君子说他是一个有缘人，要带他去看一看这个世界的另一面。\
        石野并不相信，但是那天晚上他做了一个很长很长的梦。";

    #[test]
    fn test_lookup_label() {
        assert_eq!(lookup_label("UTF-8"), Some(UTF_8));
        assert_eq!(lookup_label("UTF-8-SIG"), Some(UTF_8));
        assert_eq!(lookup_label("GB2312"), Some(GBK));
        assert_eq!(lookup_label(""), None);
        assert_eq!(lookup_label("not-an-encoding"), None);
    }

    #[test]
    fn test_low_confidence_falls_back() {
        let config = EncodingConfig::default();
        let guess = choose_encoding("Big5", 0.42, &config);
        assert!(guess.fell_back);
        assert_eq!(guess.encoding, GB18030);
        assert_eq!(guess.detected_label, "Big5");
    }

    #[test]
    fn test_empty_label_falls_back() {
        let guess = choose_encoding("", 0.99, &EncodingConfig::default());
        assert!(guess.fell_back);
        assert_eq!(guess.encoding, GB18030);
    }

    #[test]
    fn test_confident_guess_used() {
        let guess = choose_encoding("utf-8", 0.99, &EncodingConfig::default());
        assert!(!guess.fell_back);
        assert_eq!(guess.encoding, UTF_8);
    }

    #[test]
    fn test_detection_reads_only_prefix() {
        let prefix = "Chapter list exported by reader app, version 1.0 ..............\n";
        assert_eq!(prefix.len(), 64);
        let repeated = SAMPLE.repeat(4);
        let (body, _, _) = GBK.encode(&repeated);
        let mut bytes = prefix.as_bytes().to_vec();
        bytes.extend_from_slice(&body);

        let narrow = EncodingConfig {
            sample_bytes: prefix.len(),
            ..Default::default()
        };
        let guess = resolve_encoding(&bytes, &narrow);
        let prefix_only = resolve_encoding(prefix.as_bytes(), &narrow);
        assert_eq!(guess.detected_label, prefix_only.detected_label);
        assert_eq!(guess.confidence, prefix_only.confidence);

        let whole = resolve_encoding(&bytes, &EncodingConfig::default());
        assert_ne!(whole.detected_label, guess.detected_label);
    }

    #[test]
    fn test_decode_utf8() {
        let decoded = decode_text(SAMPLE.as_bytes(), &EncodingConfig::default());
        assert_eq!(decoded.text, SAMPLE);
        assert!(!decoded.had_errors);
    }

    #[test]
    fn test_decode_gbk() {
        let (bytes, _, _) = GBK.encode(SAMPLE);
        let decoded = decode_text(&bytes, &EncodingConfig::default());
        assert_eq!(decoded.text, SAMPLE);
    }

    #[test]
    fn test_bom_wins() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("第一章".as_bytes());
        let decoded = decode_text(&bytes, &EncodingConfig::default());
        assert_eq!(decoded.text, "第一章");
        assert_eq!(decoded.encoding, UTF_8);
    }

    #[test]
    fn test_invalid_bytes_replaced() {
        let (text, _, had_errors) = UTF_8.decode(&[0xE4, 0xB8, b'a', b'b']);
        assert!(had_errors);
        assert!(text.contains('\u{FFFD}'));
        assert!(text.ends_with("ab"));
    }

    #[test]
    fn test_empty_input() {
        let decoded = decode_text(b"", &EncodingConfig::default());
        assert!(decoded.text.is_empty());
    }
}
