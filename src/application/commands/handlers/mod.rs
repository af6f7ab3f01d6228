//! Command Handlers

mod extraction_handlers;

pub use extraction_handlers::{
    CancelExtractionHandler, CancelExtractionResponse, StartExtractionHandler,
    StartExtractionResponse,
};
