use crate::core::parser::{Capabilities, EventSink, Extractor, StructureEvent};
use crate::error::{IngestError, Result};
use lopdf::Document;

/// Page-by-page PDF text extraction using lopdf.
///
/// PDFs carry no heading structure here: the whole document lands in one
/// synthesized section with one text block per page.
pub struct LopdfParser;

impl LopdfParser {
    fn extract_page(&self, doc: &Document, page_num: u32) -> Result<String> {
        doc.extract_text(&[page_num]).map_err(|e| {
            IngestError::Extraction(format!("failed to extract text of page {}: {}", page_num, e))
        })
    }
}

impl Extractor for LopdfParser {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            headings: false,
            pages: true,
        }
    }

    fn extract(&self, bytes: &[u8], sink: &mut dyn EventSink) -> Result<()> {
        let doc = Document::load_mem(bytes)?;
        let pages = doc.get_pages();

        sink.emit(StructureEvent::DefaultSection)?;
        for (index, page_num) in pages.keys().enumerate() {
            let text = self.extract_page(&doc, *page_num)?;
            sink.emit(StructureEvent::Page { index, text })?;
        }
        Ok(())
    }
}
