// src/core/docx_parser.rs
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;
use roxmltree::{Document, Node};
use crate::core::parser::{Capabilities, EventSink, Extractor, StructureEvent};
use crate::error::{IngestError, Result};
use crate::model::TableData;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const HEADING_PREFIX: &str = "heading";

/// Paragraph as it appears in `word/document.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParagraph {
    /// Resolved style name, `None` for the default paragraph style.
    pub style_name: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

/// Top-level body paragraphs and tables, each in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDocx {
    pub paragraphs: Vec<RawParagraph>,
    pub tables: Vec<RawTable>,
}

/// Style id → display name, from `word/styles.xml`.
#[derive(Debug, Clone, Default)]
struct StyleSheet {
    names: HashMap<String, String>,
}

impl StyleSheet {
    fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        let mut names = HashMap::new();

        for style_node in doc.root_element().children().filter(|n| n.tag_name().name() == "style") {
            if let Some(style_id) = style_node.attribute((W_NS, "styleId")) {
                let name = style_node
                    .children()
                    .find(|n| n.tag_name().name() == "name")
                    .and_then(|n| n.attribute((W_NS, "val")))
                    .unwrap_or(style_id);
                names.insert(style_id.to_string(), name.to_string());
            }
        }
        Ok(Self { names })
    }

    /// Unknown ids resolve to themselves.
    fn name_for<'a>(&'a self, style_id: &'a str) -> &'a str {
        self.names.get(style_id).map(String::as_str).unwrap_or(style_id)
    }
}

/// Heading level encoded in a paragraph style name such as `Heading 2`.
///
/// Returns `Ok(None)` for non-heading styles and a format error when the
/// name claims to be a heading but carries no positive level.
pub fn heading_level(style_name: &str) -> Result<Option<u32>> {
    let is_heading = style_name
        .get(..HEADING_PREFIX.len())
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(HEADING_PREFIX));
    if !is_heading {
        return Ok(None);
    }

    let rest = style_name[HEADING_PREFIX.len()..].trim();
    match rest.parse::<u32>() {
        Ok(level) if level > 0 => Ok(Some(level)),
        _ => Err(IngestError::Format(format!(
            "heading style `{}` does not encode a positive level",
            style_name
        ))),
    }
}

pub struct DocxParser;

impl DocxParser {
    pub fn new() -> Self {
        Self
    }

    /// Read the paragraph and table sequences out of a `.docx` package.
    pub fn read(&self, bytes: &[u8]) -> Result<RawDocx> {
        self.parse_archive(Cursor::new(bytes))
    }

    fn parse_archive<R: Read + Seek>(&self, reader: R) -> Result<RawDocx> {
        let mut archive = ZipArchive::new(reader)?;

        let styles = match archive.by_name("word/styles.xml") {
            Ok(mut file) => {
                let mut styles_xml = String::new();
                file.read_to_string(&mut styles_xml)
                    .map_err(|e| IngestError::Extraction(format!("unreadable styles.xml: {}", e)))?;
                StyleSheet::parse(&styles_xml)?
            }
            Err(ZipError::FileNotFound) => StyleSheet::default(),
            Err(e) => return Err(e.into()),
        };

        let mut doc_xml_bytes = Vec::new();
        archive
            .by_name("word/document.xml")?
            .read_to_end(&mut doc_xml_bytes)
            .map_err(|e| IngestError::Extraction(format!("unreadable document.xml: {}", e)))?;
        let doc_xml = String::from_utf8(doc_xml_bytes)
            .map_err(|e| IngestError::Extraction(format!("document.xml is not UTF-8: {}", e)))?;
        let doc = Document::parse(&doc_xml)?;

        let body = doc
            .root_element()
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "body")
            .ok_or_else(|| IngestError::Extraction("document.xml has no body".into()))?;

        let mut raw = RawDocx::default();
        for node in body.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "p" => raw.paragraphs.push(self.parse_paragraph(&node, &styles)),
                "tbl" => raw.tables.push(self.parse_table(&node)),
                _ => {}
            }
        }
        Ok(raw)
    }

    fn parse_paragraph(&self, para: &Node, styles: &StyleSheet) -> RawParagraph {
        let style_name = para
            .children()
            .find(|n| n.tag_name().name() == "pPr")
            .and_then(|ppr| {
                ppr.children()
                    .find(|n| n.tag_name().name() == "pStyle")
                    .and_then(|ps| ps.attribute((W_NS, "val")))
            })
            .map(|style_id| styles.name_for(style_id).to_string());

        RawParagraph {
            style_name,
            text: self.extract_text_from_paragraph(para),
        }
    }

    /// Concatenated run text; tabs and breaks become `\t` and `\n`.
    fn extract_text_from_paragraph(&self, para: &Node) -> String {
        let mut text = String::new();
        for run in para.descendants().filter(|n| n.is_element() && n.tag_name().name() == "r") {
            for child in run.children().filter(|n| n.is_element()) {
                match child.tag_name().name() {
                    "t" => text.push_str(child.text().unwrap_or("")),
                    "tab" => text.push('\t'),
                    "br" | "cr" => text.push('\n'),
                    _ => {}
                }
            }
        }
        text
    }

    /// Rows laid out on the table grid: a `gridSpan` cell fills every column it
    /// covers and a `vMerge` continuation repeats the text of the cell above.
    fn parse_table(&self, tbl: &Node) -> RawTable {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for tr in tbl.children().filter(|n| n.is_element() && n.tag_name().name() == "tr") {
            let mut row: Vec<String> = Vec::new();
            for tc in tr.children().filter(|n| n.is_element() && n.tag_name().name() == "tc") {
                let props = tc.children().find(|n| n.tag_name().name() == "tcPr");
                let span = props
                    .and_then(|p| p.children().find(|n| n.tag_name().name() == "gridSpan"))
                    .and_then(|g| g.attribute((W_NS, "val")))
                    .and_then(|v| v.parse::<usize>().ok())
                    .filter(|span| *span > 0)
                    .unwrap_or(1);
                let continues_merge = props
                    .and_then(|p| p.children().find(|n| n.tag_name().name() == "vMerge"))
                    .map_or(false, |vm| vm.attribute((W_NS, "val")) != Some("restart"));

                let text = if continues_merge {
                    rows.last()
                        .and_then(|above| above.get(row.len()))
                        .cloned()
                        .unwrap_or_default()
                } else {
                    self.cell_text(&tc)
                };
                row.extend(std::iter::repeat(text).take(span));
            }
            rows.push(row);
        }
        RawTable { rows }
    }

    fn cell_text(&self, tc: &Node) -> String {
        tc.children()
            .filter(|n| n.is_element() && n.tag_name().name() == "p")
            .map(|p| self.extract_text_from_paragraph(&p))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for DocxParser {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            headings: true,
            pages: false,
        }
    }

    /// Paragraphs first, in order; then every table, attached to whichever
    /// section is current once the paragraph pass has finished.
    fn extract(&self, bytes: &[u8], sink: &mut dyn EventSink) -> Result<()> {
        let raw = self.read(bytes)?;

        for paragraph in raw.paragraphs {
            let level = match paragraph.style_name.as_deref() {
                Some(style) => heading_level(style)?,
                None => None,
            };
            match level {
                Some(level) => sink.emit(StructureEvent::Heading {
                    level,
                    title: paragraph.text,
                })?,
                None if !paragraph.text.trim().is_empty() => {
                    sink.emit(StructureEvent::Text(paragraph.text))?
                }
                None => {}
            }
        }

        for table in raw.tables {
            sink.emit(StructureEvent::Table(TableData::from_rows(table.rows)))?;
        }
        Ok(())
    }
}
