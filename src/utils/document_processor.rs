use crate::config::ProcessorConfig;
use crate::core::detect::{detect_format, FormatId};
use crate::core::hierarchy::HierarchyBuilder;
use crate::core::parser::UniversalParser;
use crate::error::{IngestError, PersistenceError, ProcessingError};
use crate::gateway::PersistenceGateway;
use crate::model::{Document, DocumentId, DocumentStatus, DocumentView};
use log::{debug, error, info, warn};

/// Drives one document at a time through `pending → processing → {processed | error}`.
///
/// Sections and content are persisted while extraction runs, so a failed
/// document keeps whatever was produced before the failure. One processor
/// may serve many documents concurrently; each call owns its own
/// [`HierarchyBuilder`].
pub struct DocumentProcessor<G: PersistenceGateway> {
    gateway: G,
    parser: UniversalParser,
    config: ProcessorConfig,
}

impl<G: PersistenceGateway> DocumentProcessor<G> {
    pub fn new(gateway: G, config: ProcessorConfig) -> Self {
        Self {
            gateway,
            parser: UniversalParser::new(&config),
            config,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Ingest `bytes`, resolving the format from the filename alone.
    pub fn process_document(&self, filename: &str, bytes: &[u8]) -> Result<DocumentId, ProcessingError> {
        self.process_document_as(filename, None, bytes)
    }

    /// Ingest `bytes`, falling back to `declared` content type when the
    /// filename extension is not recognised.
    pub fn process_document_as(
        &self,
        filename: &str,
        declared: Option<&str>,
        bytes: &[u8],
    ) -> Result<DocumentId, ProcessingError> {
        let format = detect_format(filename, declared);
        let document = Document::new(filename, format);
        let document_id = document.id;

        self.gateway
            .insert_document(&document)
            .map_err(|e| ProcessingError {
                document_id: None,
                source: e.into(),
            })?;
        self.gateway
            .update_document_status(document_id, DocumentStatus::Processing, None)
            .map_err(|e| ProcessingError {
                document_id: Some(document_id),
                source: e.into(),
            })?;

        info!(
            "Processing document {} ({}, {} bytes) as {}",
            filename,
            document_id,
            bytes.len(),
            format
        );

        match self.extract(document_id, format, bytes) {
            Ok(()) => {
                self.gateway
                    .update_document_status(document_id, DocumentStatus::Processed, None)
                    .map_err(|e| ProcessingError {
                        document_id: Some(document_id),
                        source: e.into(),
                    })?;
                info!("Document {} processed", document_id);
                Ok(document_id)
            }
            Err(e) => {
                error!("Failed to process document {} ({}): {}", filename, document_id, e);
                let message = e.to_string();
                if let Err(status_err) = self.gateway.update_document_status(
                    document_id,
                    DocumentStatus::Error,
                    Some(&message),
                ) {
                    warn!(
                        "Could not record error status for document {}: {}",
                        document_id, status_err
                    );
                }
                Err(ProcessingError {
                    document_id: Some(document_id),
                    source: e,
                })
            }
        }
    }

    fn extract(&self, document_id: DocumentId, format: FormatId, bytes: &[u8]) -> Result<(), IngestError> {
        let extractor = self.parser.for_format(format);
        match format {
            FormatId::UnsupportedLegacy | FormatId::UnknownBinary => {
                warn!(
                    "Document {} has unsupported format {}, storing diagnostic only",
                    document_id, format
                );
            }
            _ => debug!("Document {} uses the {} extractor", document_id, extractor.name()),
        }

        let mut builder =
            HierarchyBuilder::new(&self.gateway, document_id, self.config.default_section_title.as_str());
        let result = extractor.extract(bytes, &mut builder);
        let summary = builder.finish();

        debug!(
            "Document {}: {} sections, {} content blocks persisted",
            document_id, summary.sections, summary.blocks
        );
        result
    }

    /// The document with its sections and content, each sorted by order.
    pub fn fetch(&self, document_id: DocumentId) -> Result<DocumentView, PersistenceError> {
        let document = self
            .gateway
            .find_document(document_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("document {}", document_id)))?;

        let mut sections = self.gateway.list_sections(document_id)?;
        sections.sort_by_key(|s| s.order);
        let mut contents = self.gateway.list_contents(document_id)?;
        contents.sort_by_key(|c| c.order);

        Ok(DocumentView {
            document,
            sections,
            contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gateway::InMemoryGateway;

    fn processor() -> DocumentProcessor<InMemoryGateway> {
        DocumentProcessor::new(InMemoryGateway::open(), ProcessorConfig::default())
    }

    #[test]
    fn test_text_document_is_processed() {
        let processor = processor();
        let id = processor.process_document("notes.txt", "hello world".as_bytes()).unwrap();

        let view = processor.fetch(id).unwrap();
        assert_eq!(view.document.status, DocumentStatus::Processed);
        assert_eq!(view.document.format, FormatId::Text);
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].title, "Uncategorized");
        assert_eq!(view.contents.len(), 1);
        assert_eq!(view.contents[0].content.as_text(), Some("hello world"));
    }

    #[test]
    fn test_decode_failure_marks_error_and_keeps_partial_state() {
        let processor = processor();
        let err = processor.process_document("bad.txt", &[0xc3, 0x28]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let id = err.document_id.unwrap();
        let view = processor.fetch(id).unwrap();
        assert_eq!(view.document.status, DocumentStatus::Error);
        assert!(view.document.error_message.unwrap().starts_with("decode error"));
        assert_eq!(view.sections.len(), 1);
        assert!(view.contents.is_empty());
    }

    #[test]
    fn test_declared_type_selects_extractor() {
        let processor = processor();
        let id = processor
            .process_document_as("upload", Some("text/plain"), b"plain")
            .unwrap();
        let view = processor.fetch(id).unwrap();
        assert_eq!(view.document.format, FormatId::Text);
        assert_eq!(view.contents[0].content.as_text(), Some("plain"));
    }

    #[test]
    fn test_closed_gateway_fails_without_document() {
        let processor = processor();
        processor.gateway().close().unwrap();

        let err = processor.process_document("a.txt", b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.document_id.is_none());
    }

    #[test]
    fn test_fetch_unknown_document() {
        let processor = processor();
        let err = processor.fetch(uuid::Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(_)));
    }
}
