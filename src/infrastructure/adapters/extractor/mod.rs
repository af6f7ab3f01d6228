//! Extractor Adapter - Ollama 结构化提取客户端

mod ollama_extractor;

pub use ollama_extractor::*;
