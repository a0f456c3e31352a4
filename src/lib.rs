pub mod core {
    pub mod detect;
    pub mod docx_parser;
    pub mod fallback;
    pub mod hierarchy;
    pub mod order;
    pub mod parser;
    pub mod pdf_parser;
}

pub mod utils {
    pub mod batch;
    pub mod document_processor;
    pub mod input;
}

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;

pub use crate::config::ProcessorConfig;
pub use crate::core::detect::{detect_format, FormatId};
pub use crate::core::parser::{Capabilities, EventSink, Extractor, StructureEvent};
pub use crate::error::{ErrorKind, IngestError, PersistenceError, ProcessingError};
pub use crate::gateway::{InMemoryGateway, PersistenceGateway};
pub use crate::model::{
    ContentBlock, ContentPayload, ContentType, Document, DocumentId, DocumentStats, DocumentStatus,
    DocumentView, Section, SectionId, TableData,
};
pub use crate::utils::document_processor::DocumentProcessor;
