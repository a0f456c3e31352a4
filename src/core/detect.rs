//! Maps a filename and/or declared content type to a canonical format.

use serde::{Deserialize, Serialize};
use std::path::Path;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOC_MIME: &str = "application/msword";
const PDF_MIME: &str = "application/pdf";
const TEXT_MIME: &str = "text/plain";
const BINARY_MIME: &str = "application/octet-stream";

/// Canonical format identifier, serialized as its MIME type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FormatId {
    #[serde(rename = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    Docx,
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "text/plain")]
    Text,
    /// Old binary word-processor format (`.doc`).
    #[serde(rename = "application/msword")]
    UnsupportedLegacy,
    #[serde(rename = "application/octet-stream")]
    UnknownBinary,
}

impl FormatId {
    pub fn mime_type(&self) -> &'static str {
        match self {
            FormatId::Docx => DOCX_MIME,
            FormatId::Pdf => PDF_MIME,
            FormatId::Text => TEXT_MIME,
            FormatId::UnsupportedLegacy => DOC_MIME,
            FormatId::UnknownBinary => BINARY_MIME,
        }
    }

    /// Recognised MIME types only; parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            DOCX_MIME => Some(FormatId::Docx),
            PDF_MIME => Some(FormatId::Pdf),
            TEXT_MIME => Some(FormatId::Text),
            DOC_MIME => Some(FormatId::UnsupportedLegacy),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(FormatId::Docx),
            "pdf" => Some(FormatId::Pdf),
            "txt" => Some(FormatId::Text),
            "doc" => Some(FormatId::UnsupportedLegacy),
            _ => None,
        }
    }
}

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Resolve the canonical format of an upload.
///
/// The filename extension wins when it is recognised; otherwise a recognised
/// declared content type decides. Anything else is [`FormatId::UnknownBinary`],
/// which is a degraded-success path rather than an error.
pub fn detect_format(filename: &str, declared: Option<&str>) -> FormatId {
    let by_extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(FormatId::from_extension);

    by_extension
        .or_else(|| declared.and_then(FormatId::from_mime))
        .unwrap_or(FormatId::UnknownBinary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(detect_format("report.docx", None), FormatId::Docx);
        assert_eq!(detect_format("scan.PDF", None), FormatId::Pdf);
        assert_eq!(detect_format("notes.txt", None), FormatId::Text);
        assert_eq!(detect_format("old.doc", None), FormatId::UnsupportedLegacy);
    }

    #[test]
    fn test_unknown_extension_is_degraded_not_error() {
        assert_eq!(detect_format("data.xyz", None), FormatId::UnknownBinary);
        assert_eq!(detect_format("no_extension", None), FormatId::UnknownBinary);
    }

    #[test]
    fn test_declared_type_used_when_extension_unknown() {
        assert_eq!(detect_format("upload", Some("application/pdf")), FormatId::Pdf);
        assert_eq!(
            detect_format("upload.bin", Some("text/plain; charset=utf-8")),
            FormatId::Text
        );
        // extension takes precedence
        assert_eq!(detect_format("a.txt", Some("application/pdf")), FormatId::Text);
        assert_eq!(detect_format("a.bin", Some("image/png")), FormatId::UnknownBinary);
    }

    #[test]
    fn test_mime_round_trip() {
        for format in [
            FormatId::Docx,
            FormatId::Pdf,
            FormatId::Text,
            FormatId::UnsupportedLegacy,
        ] {
            assert_eq!(FormatId::from_mime(format.mime_type()), Some(format));
        }
        assert_eq!(FormatId::from_mime(BINARY_MIME), None);
    }
}
