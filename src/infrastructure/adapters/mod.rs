//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod embedder;
pub mod extractor;
pub mod storage;

pub use embedder::*;
pub use extractor::*;
pub use storage::*;
