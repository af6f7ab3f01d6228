//! 降级向量
//!
//! 向量服务不可用时，由文本的 MD5 摘要确定性地派生固定维度向量：
//! 第 i 维取 `digest[i % 16]`，字节 b 线性映射为 `b / 255 * 2 - 1`。
//! 相同文本总是得到相同向量。

use super::value_objects::EmbeddingVector;

/// 生成确定性降级向量
pub fn fallback_vector(text: &str, dimension: usize) -> EmbeddingVector {
    let digest = md5::compute(text.as_bytes());
    let bytes = digest.0;

    (0..dimension)
        .map(|i| {
            let b = bytes[i % bytes.len()];
            (f32::from(b) / 255.0) * 2.0 - 1.0
        })
        .collect()
}
