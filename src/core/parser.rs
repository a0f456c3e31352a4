use crate::config::ProcessorConfig;
use crate::core::detect::FormatId;
use crate::core::docx_parser::DocxParser;
use crate::core::fallback::{NoticeExtractor, TextExtractor};
use crate::core::pdf_parser::LopdfParser;
use crate::error::Result;
use crate::model::TableData;

/// Canonical structural signal emitted by an extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureEvent {
    /// Opens a section; closes every open section at `level` or deeper.
    Heading { level: u32, title: String },
    /// Text attached to the current section.
    Text(String),
    /// Table attached to the current section.
    Table(TableData),
    /// Text of the zero-based page `index`.
    Page { index: usize, text: String },
    /// Synthesizes the level-0 default section up front.
    DefaultSection,
}

/// Consumer of an extractor's event stream.
pub trait EventSink {
    fn emit(&mut self, event: StructureEvent) -> Result<()>;
}

impl EventSink for Vec<StructureEvent> {
    fn emit(&mut self, event: StructureEvent) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

/// What kind of structure an extractor can recover from its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub headings: bool,
    pub pages: bool,
}

/// Format-specific reader turning raw bytes into [`StructureEvent`]s.
///
/// Events are pushed to the sink as they are produced so the sink can persist
/// them immediately; an error aborts extraction with whatever was already
/// emitted left in place.
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn extract(&self, bytes: &[u8], sink: &mut dyn EventSink) -> Result<()>;
}

/// Holds one extractor per canonical format.
pub struct UniversalParser {
    pub docx_parser: DocxParser,
    pub pdf_parser: LopdfParser,
    pub text_extractor: TextExtractor,
    pub legacy_extractor: NoticeExtractor,
    pub unknown_extractor: NoticeExtractor,
}

impl UniversalParser {
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            docx_parser: DocxParser::new(),
            pdf_parser: LopdfParser,
            text_extractor: TextExtractor,
            legacy_extractor: NoticeExtractor::new("legacy", config.legacy_notice.clone()),
            unknown_extractor: NoticeExtractor::new("unknown", config.unknown_notice.clone()),
        }
    }

    pub fn for_format(&self, format: FormatId) -> &dyn Extractor {
        match format {
            FormatId::Docx => &self.docx_parser,
            FormatId::Pdf => &self.pdf_parser,
            FormatId::Text => &self.text_extractor,
            FormatId::UnsupportedLegacy => &self.legacy_extractor,
            FormatId::UnknownBinary => &self.unknown_extractor,
        }
    }
}

impl Default for UniversalParser {
    fn default() -> Self {
        Self::new(&ProcessorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_extractor_by_format() {
        let parser = UniversalParser::default();
        assert_eq!(parser.for_format(FormatId::Docx).name(), "docx");
        assert_eq!(parser.for_format(FormatId::Pdf).name(), "pdf");
        assert_eq!(parser.for_format(FormatId::Text).name(), "text");
        assert_eq!(parser.for_format(FormatId::UnsupportedLegacy).name(), "legacy");
        assert_eq!(parser.for_format(FormatId::UnknownBinary).name(), "unknown");
    }

    #[test]
    fn test_capabilities() {
        let parser = UniversalParser::default();
        let docx = parser.for_format(FormatId::Docx).capabilities();
        assert!(docx.headings && !docx.pages);
        let pdf = parser.for_format(FormatId::Pdf).capabilities();
        assert!(!pdf.headings && pdf.pages);
        assert_eq!(
            parser.for_format(FormatId::Text).capabilities(),
            Capabilities::default()
        );
    }
}
