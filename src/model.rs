//! Persisted entities: documents, sections and content blocks.

use crate::core::detect::FormatId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DocumentId = Uuid;
pub type SectionId = Uuid;
pub type ContentId = Uuid;

/// Lifecycle of a document: `pending → processing → {processed | error}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Processed,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Processed => "processed",
            DocumentStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Processed | DocumentStatus::Error)
    }

    /// Whether `self → next` is a forward step of the lifecycle.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Pending, DocumentStatus::Processing)
                | (DocumentStatus::Processing, DocumentStatus::Processed)
                | (DocumentStatus::Processing, DocumentStatus::Error)
        )
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    /// Canonical format, persisted as its MIME type.
    #[serde(rename = "file_type")]
    pub format: FormatId,
    pub status: DocumentStatus,
    pub upload_time: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Document {
    /// A fresh `pending` document with a newly generated identifier.
    pub fn new(filename: impl Into<String>, format: FormatId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            format,
            status: DocumentStatus::Pending,
            upload_time: now,
            last_modified: now,
            error_message: None,
        }
    }
}

/// A node of the per-document hierarchy. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub document_id: DocumentId,
    pub title: String,
    /// 0 for synthesized default sections, otherwise the heading level.
    pub level: u32,
    pub parent_id: Option<SectionId>,
    /// Position among siblings sharing `parent_id`.
    pub order: u32,
    /// Dot-delimited ordinal path, e.g. `1.2.3`.
    pub section_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Table,
    Image,
}

/// Table payload: the first source row becomes `headers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    /// Split raw rows into header row and body rows.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let headers = rows.remove(0);
        Self { headers, rows }
    }
}

/// Content payload, persisted as the `content` field of a block.
///
/// The shapes overlap (an image value may carry `text` or `headers`), so the
/// payload is only read back through [`ContentPayload::from_value`] keyed by
/// the block's `content_type`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ContentPayload {
    Text { text: String },
    Table(TableData),
    Image(serde_json::Value),
}

impl ContentPayload {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPayload::Text { text: text.into() }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ContentPayload::Text { .. } => ContentType::Text,
            ContentPayload::Table(_) => ContentType::Table,
            ContentPayload::Image(_) => ContentType::Image,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPayload::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Decode a persisted `content` value as the variant named by `content_type`.
    pub fn from_value(
        content_type: ContentType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct TextContent {
            text: String,
        }

        Ok(match content_type {
            ContentType::Text => ContentPayload::Text {
                text: serde_json::from_value::<TextContent>(value)?.text,
            },
            ContentType::Table => ContentPayload::Table(serde_json::from_value(value)?),
            ContentType::Image => ContentPayload::Image(value),
        })
    }
}

/// Persisted form of a [`ContentBlock`] before `content` is matched to `content_type`.
#[derive(Deserialize)]
struct StoredContentBlock {
    id: ContentId,
    document_id: DocumentId,
    section_id: SectionId,
    content_type: ContentType,
    order: u32,
    content: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoredContentBlock> for ContentBlock {
    type Error = serde_json::Error;

    fn try_from(stored: StoredContentBlock) -> Result<Self, Self::Error> {
        Ok(Self {
            id: stored.id,
            document_id: stored.document_id,
            section_id: stored.section_id,
            content_type: stored.content_type,
            order: stored.order,
            content: ContentPayload::from_value(stored.content_type, stored.content)?,
            created_at: stored.created_at,
        })
    }
}

/// An ordered, typed unit of content attached to exactly one section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "StoredContentBlock")]
pub struct ContentBlock {
    pub id: ContentId,
    pub document_id: DocumentId,
    pub section_id: SectionId,
    pub content_type: ContentType,
    /// Position within the owning section's content list.
    pub order: u32,
    pub content: ContentPayload,
    pub created_at: DateTime<Utc>,
}

impl ContentBlock {
    pub fn new(
        document_id: DocumentId,
        section_id: SectionId,
        order: u32,
        content: ContentPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            section_id,
            content_type: content.content_type(),
            order,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Record counts across every stored document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentStats {
    pub total_documents: usize,
    pub total_sections: usize,
    pub total_contents: usize,
}

/// A document with its sections and content, each sorted by `order`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentView {
    pub document: Document,
    pub sections: Vec<Section>,
    pub contents: Vec<ContentBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_only_moves_forward() {
        use DocumentStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Processed));
        assert!(Processing.can_transition_to(Error));
        assert!(!Pending.can_transition_to(Processed));
        assert!(!Processed.can_transition_to(Processing));
        assert!(!Error.can_transition_to(Processed));
        assert!(Processed.is_terminal() && Error.is_terminal());
    }

    #[test]
    fn test_table_from_rows() {
        let table = TableData::from_rows(vec![
            vec!["name".into(), "qty".into()],
            vec!["apple".into(), "3".into()],
        ]);
        assert_eq!(table.headers, vec!["name", "qty"]);
        assert_eq!(table.rows, vec![vec!["apple".to_string(), "3".to_string()]]);

        assert_eq!(TableData::from_rows(Vec::new()), TableData::default());
    }

    #[test]
    fn test_content_serializes_persisted_shape() {
        let doc_id = Uuid::new_v4();
        let sec_id = Uuid::new_v4();

        let text = ContentBlock::new(doc_id, sec_id, 10, ContentPayload::text("hello"));
        let value = serde_json::to_value(&text).unwrap();
        assert_eq!(value["content_type"], "text");
        assert_eq!(value["content"], json!({ "text": "hello" }));

        let table = ContentBlock::new(
            doc_id,
            sec_id,
            20,
            ContentPayload::Table(TableData {
                headers: vec!["a".into()],
                rows: vec![vec!["1".into()]],
            }),
        );
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["content_type"], "table");
        assert_eq!(value["content"], json!({ "headers": ["a"], "rows": [["1"]] }));
    }

    #[test]
    fn test_content_reads_back_by_content_type() {
        let doc_id = Uuid::new_v4();
        let sec_id = Uuid::new_v4();
        let payloads = [
            ContentPayload::text("hello"),
            ContentPayload::Table(TableData {
                headers: vec!["k".into(), "v".into()],
                rows: vec![vec!["a".into(), "1".into()]],
            }),
            ContentPayload::Image(json!({ "text": "caption", "url": "x.png" })),
            ContentPayload::Image(json!({ "headers": ["h"], "rows": [] })),
        ];

        for (i, payload) in payloads.into_iter().enumerate() {
            let block = ContentBlock::new(doc_id, sec_id, (i as u32 + 1) * 10, payload);
            let json = serde_json::to_string(&block).unwrap();
            let back: ContentBlock = serde_json::from_str(&json).unwrap();
            assert_eq!(back, block);
            assert_eq!(back.content.content_type(), back.content_type);
        }
    }

    #[test]
    fn test_content_mismatching_type_is_rejected() {
        let block = ContentBlock::new(Uuid::new_v4(), Uuid::new_v4(), 10, ContentPayload::text("x"));
        let mut value = serde_json::to_value(&block).unwrap();
        value["content_type"] = json!("table");
        assert!(serde_json::from_value::<ContentBlock>(value).is_err());
    }

    #[test]
    fn test_document_serializes_file_type_as_mime() {
        let doc = Document::new("report.pdf", FormatId::Pdf);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["file_type"], "application/pdf");
        assert_eq!(value["status"], "pending");
        assert!(value.get("error_message").is_none());
    }
}
