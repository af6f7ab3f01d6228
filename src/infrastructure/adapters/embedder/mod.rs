//! Embedder Adapter - Ollama 向量客户端

mod ollama_embedder;

pub use ollama_embedder::*;
