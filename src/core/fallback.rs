//! Extractors for payloads without recoverable structure.

use crate::core::parser::{Capabilities, EventSink, Extractor, StructureEvent};
use crate::error::Result;

/// Whole payload as one UTF-8 text block under a default section.
pub struct TextExtractor;

impl Extractor for TextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn extract(&self, bytes: &[u8], sink: &mut dyn EventSink) -> Result<()> {
        sink.emit(StructureEvent::DefaultSection)?;
        let text = std::str::from_utf8(bytes)?;
        sink.emit(StructureEvent::Text(text.to_string()))
    }
}

/// Degraded path: never reads the payload, stores a fixed diagnostic instead.
pub struct NoticeExtractor {
    name: &'static str,
    notice: String,
}

impl NoticeExtractor {
    pub fn new(name: &'static str, notice: impl Into<String>) -> Self {
        Self {
            name,
            notice: notice.into(),
        }
    }
}

impl Extractor for NoticeExtractor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn extract(&self, _bytes: &[u8], sink: &mut dyn EventSink) -> Result<()> {
        sink.emit(StructureEvent::DefaultSection)?;
        sink.emit(StructureEvent::Text(self.notice.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_text_is_single_block() {
        let mut events: Vec<StructureEvent> = Vec::new();
        TextExtractor.extract("line one\nline two".as_bytes(), &mut events).unwrap();
        assert_eq!(
            events,
            vec![
                StructureEvent::DefaultSection,
                StructureEvent::Text("line one\nline two".into()),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_fails_after_default_section() {
        let mut events: Vec<StructureEvent> = Vec::new();
        let err = TextExtractor.extract(&[0x68, 0x69, 0xff, 0xfe], &mut events).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(events, vec![StructureEvent::DefaultSection]);
    }

    #[test]
    fn test_notice_ignores_payload() {
        let extractor = NoticeExtractor::new("legacy", "convert me");
        let mut events: Vec<StructureEvent> = Vec::new();
        extractor.extract(&[0xd0, 0xcf, 0x11, 0xe0], &mut events).unwrap();
        assert_eq!(
            events,
            vec![
                StructureEvent::DefaultSection,
                StructureEvent::Text("convert me".into()),
            ]
        );
    }
}
