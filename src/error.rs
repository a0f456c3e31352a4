//! Error taxonomy for document ingestion.

use crate::model::DocumentId;
use thiserror::Error;

/// Result alias used across the extraction pipeline.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised by a [`crate::gateway::PersistenceGateway`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The gateway was closed by its owner.
    #[error("gateway is closed")]
    Closed,

    /// A lock guarding gateway state was poisoned by a panicking writer.
    #[error("gateway state is poisoned")]
    Poisoned,

    /// The requested record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors that terminate processing of a single document.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Malformed or unparseable structural marker (e.g. a heading level).
    #[error("format error: {0}")]
    Format(String),

    /// Payload is not valid text in the expected encoding.
    #[error("decode error: {0}")]
    Decode(String),

    /// The format-specific decoding step failed.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Propagated unchanged from the gateway.
    #[error("persistence error: {0}")]
    Persistence(PersistenceError),
}

/// Coarse classification of an [`IngestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Decode,
    Extraction,
    Persistence,
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Format(_) => ErrorKind::Format,
            IngestError::Decode(_) => ErrorKind::Decode,
            IngestError::Extraction(_) => ErrorKind::Extraction,
            IngestError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<PersistenceError> for IngestError {
    fn from(err: PersistenceError) -> Self {
        IngestError::Persistence(err)
    }
}

impl From<zip::result::ZipError> for IngestError {
    fn from(err: zip::result::ZipError) -> Self {
        IngestError::Extraction(format!("invalid docx archive: {}", err))
    }
}

impl From<roxmltree::Error> for IngestError {
    fn from(err: roxmltree::Error) -> Self {
        IngestError::Extraction(format!("invalid docx xml: {}", err))
    }
}

impl From<lopdf::Error> for IngestError {
    fn from(err: lopdf::Error) -> Self {
        IngestError::Extraction(format!("invalid pdf: {}", err))
    }
}

impl From<std::str::Utf8Error> for IngestError {
    fn from(err: std::str::Utf8Error) -> Self {
        IngestError::Decode(format!("payload is not valid UTF-8: {}", err))
    }
}

/// Typed failure returned by [`crate::DocumentProcessor::process_document`].
///
/// `document_id` is `None` only when the initial document record could not
/// be written; otherwise the document exists with status `error` and any
/// sections or content produced before the failure remain queryable.
#[derive(Error, Debug)]
#[error("failed to process {}", describe_document(.document_id))]
pub struct ProcessingError {
    pub document_id: Option<DocumentId>,
    #[source]
    pub source: IngestError,
}

impl ProcessingError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

fn describe_document(document_id: &Option<DocumentId>) -> String {
    match document_id {
        Some(id) => format!("document {}", id),
        None => "unsaved document".to_string(),
    }
}

/// Configuration loading or validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
