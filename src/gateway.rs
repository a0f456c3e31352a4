//! Persistence boundary for documents, sections and content.
//!
//! The processing core only talks to storage through [`PersistenceGateway`].
//! [`InMemoryGateway`] is the bundled implementation used by the CLI and tests.

use crate::error::PersistenceError;
use crate::model::{
    ContentBlock, Document, DocumentId, DocumentStats, DocumentStatus, Section, SectionId,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub type GatewayResult<T> = std::result::Result<T, PersistenceError>;

/// Storage operations the processing core depends on.
///
/// Implementations own their connection lifecycle: the caller opens the
/// gateway, hands it to a [`crate::DocumentProcessor`], and calls
/// [`close`](PersistenceGateway::close) when done.
pub trait PersistenceGateway: Send + Sync {
    fn insert_document(&self, document: &Document) -> GatewayResult<()>;

    /// Move a document to `status`, stamping `last_modified`.
    fn update_document_status(
        &self,
        id: DocumentId,
        status: DocumentStatus,
        error_message: Option<&str>,
    ) -> GatewayResult<()>;

    fn insert_section(&self, section: &Section) -> GatewayResult<()>;

    /// Highest `order` among sections of `document_id` whose parent is `parent_id`.
    fn last_child_order(
        &self,
        document_id: DocumentId,
        parent_id: Option<SectionId>,
    ) -> GatewayResult<Option<u32>>;

    fn insert_content(&self, content: &ContentBlock) -> GatewayResult<()>;

    /// Highest `order` among content blocks of `section_id`.
    fn last_content_order(&self, section_id: SectionId) -> GatewayResult<Option<u32>>;

    fn find_document(&self, id: DocumentId) -> GatewayResult<Option<Document>>;

    /// Sections of a document in insertion order.
    fn list_sections(&self, document_id: DocumentId) -> GatewayResult<Vec<Section>>;

    /// Content blocks of a document in insertion order.
    fn list_contents(&self, document_id: DocumentId) -> GatewayResult<Vec<ContentBlock>>;

    /// Totals of documents, sections and content blocks, whatever their status.
    fn stats(&self) -> GatewayResult<DocumentStats>;

    fn close(&self) -> GatewayResult<()> {
        Ok(())
    }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Arc<G> {
    fn insert_document(&self, document: &Document) -> GatewayResult<()> {
        (**self).insert_document(document)
    }

    fn update_document_status(
        &self,
        id: DocumentId,
        status: DocumentStatus,
        error_message: Option<&str>,
    ) -> GatewayResult<()> {
        (**self).update_document_status(id, status, error_message)
    }

    fn insert_section(&self, section: &Section) -> GatewayResult<()> {
        (**self).insert_section(section)
    }

    fn last_child_order(
        &self,
        document_id: DocumentId,
        parent_id: Option<SectionId>,
    ) -> GatewayResult<Option<u32>> {
        (**self).last_child_order(document_id, parent_id)
    }

    fn insert_content(&self, content: &ContentBlock) -> GatewayResult<()> {
        (**self).insert_content(content)
    }

    fn last_content_order(&self, section_id: SectionId) -> GatewayResult<Option<u32>> {
        (**self).last_content_order(section_id)
    }

    fn find_document(&self, id: DocumentId) -> GatewayResult<Option<Document>> {
        (**self).find_document(id)
    }

    fn list_sections(&self, document_id: DocumentId) -> GatewayResult<Vec<Section>> {
        (**self).list_sections(document_id)
    }

    fn list_contents(&self, document_id: DocumentId) -> GatewayResult<Vec<ContentBlock>> {
        (**self).list_contents(document_id)
    }

    fn stats(&self) -> GatewayResult<DocumentStats> {
        (**self).stats()
    }

    fn close(&self) -> GatewayResult<()> {
        (**self).close()
    }
}

#[derive(Debug, Default)]
struct Tables {
    documents: HashMap<DocumentId, Document>,
    sections: Vec<Section>,
    contents: Vec<ContentBlock>,
}

/// Process-local gateway backed by a mutex-guarded set of tables.
///
/// Each call takes the lock once, so order lookups and inserts from different
/// documents interleave safely. Lookup-then-insert for the same scope is still
/// two calls and is not atomic.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    tables: Mutex<Tables>,
    closed: AtomicBool,
}

impl InMemoryGateway {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn tables(&self) -> GatewayResult<MutexGuard<'_, Tables>> {
        if self.is_closed() {
            return Err(PersistenceError::Closed);
        }
        self.tables.lock().map_err(|_| PersistenceError::Poisoned)
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn insert_document(&self, document: &Document) -> GatewayResult<()> {
        let mut tables = self.tables()?;
        if tables.documents.contains_key(&document.id) {
            return Err(PersistenceError::Backend(format!(
                "duplicate document id {}",
                document.id
            )));
        }
        tables.documents.insert(document.id, document.clone());
        Ok(())
    }

    fn update_document_status(
        &self,
        id: DocumentId,
        status: DocumentStatus,
        error_message: Option<&str>,
    ) -> GatewayResult<()> {
        let mut tables = self.tables()?;
        let document = tables
            .documents
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::NotFound(format!("document {}", id)))?;

        if document.status.is_terminal() {
            return Err(PersistenceError::Backend(format!(
                "document {} is already {}",
                id, document.status
            )));
        }
        if !document.status.can_transition_to(status) {
            return Err(PersistenceError::Backend(format!(
                "illegal status transition {} -> {} for document {}",
                document.status, status, id
            )));
        }

        document.status = status;
        document.last_modified = Utc::now();
        if let Some(message) = error_message {
            document.error_message = Some(message.to_string());
        }
        Ok(())
    }

    fn insert_section(&self, section: &Section) -> GatewayResult<()> {
        let mut tables = self.tables()?;
        if !tables.documents.contains_key(&section.document_id) {
            return Err(PersistenceError::NotFound(format!(
                "document {}",
                section.document_id
            )));
        }
        tables.sections.push(section.clone());
        Ok(())
    }

    fn last_child_order(
        &self,
        document_id: DocumentId,
        parent_id: Option<SectionId>,
    ) -> GatewayResult<Option<u32>> {
        let tables = self.tables()?;
        Ok(tables
            .sections
            .iter()
            .filter(|s| s.document_id == document_id && s.parent_id == parent_id)
            .map(|s| s.order)
            .max())
    }

    fn insert_content(&self, content: &ContentBlock) -> GatewayResult<()> {
        let mut tables = self.tables()?;
        let owner_exists = tables
            .sections
            .iter()
            .any(|s| s.id == content.section_id && s.document_id == content.document_id);
        if !owner_exists {
            return Err(PersistenceError::NotFound(format!(
                "section {} in document {}",
                content.section_id, content.document_id
            )));
        }
        tables.contents.push(content.clone());
        Ok(())
    }

    fn last_content_order(&self, section_id: SectionId) -> GatewayResult<Option<u32>> {
        let tables = self.tables()?;
        Ok(tables
            .contents
            .iter()
            .filter(|c| c.section_id == section_id)
            .map(|c| c.order)
            .max())
    }

    fn find_document(&self, id: DocumentId) -> GatewayResult<Option<Document>> {
        Ok(self.tables()?.documents.get(&id).cloned())
    }

    fn list_sections(&self, document_id: DocumentId) -> GatewayResult<Vec<Section>> {
        Ok(self
            .tables()?
            .sections
            .iter()
            .filter(|s| s.document_id == document_id)
            .cloned()
            .collect())
    }

    fn list_contents(&self, document_id: DocumentId) -> GatewayResult<Vec<ContentBlock>> {
        Ok(self
            .tables()?
            .contents
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect())
    }

    fn stats(&self) -> GatewayResult<DocumentStats> {
        let tables = self.tables()?;
        Ok(DocumentStats {
            total_documents: tables.documents.len(),
            total_sections: tables.sections.len(),
            total_contents: tables.contents.len(),
        })
    }

    fn close(&self) -> GatewayResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
