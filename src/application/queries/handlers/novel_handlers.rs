//! Novel Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::NovelLibraryPort;
use crate::application::queries::ListNovelFiles;

/// ListNovelFiles Handler
pub struct ListNovelFilesHandler {
    library: Arc<dyn NovelLibraryPort>,
}

impl ListNovelFilesHandler {
    pub fn new(library: Arc<dyn NovelLibraryPort>) -> Self {
        Self { library }
    }

    pub async fn handle(&self, _query: ListNovelFiles) -> Result<Vec<String>, ApplicationError> {
        Ok(self.library.list().await?)
    }
}
