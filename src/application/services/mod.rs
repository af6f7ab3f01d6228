//! Application Services - 组合端口的应用服务

mod resilient_embedder;

pub use resilient_embedder::{EmbeddingOutcome, EmbeddingSource, ResilientEmbedder};
