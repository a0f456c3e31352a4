//! Turns a structural event stream into persisted sections and content.

use crate::core::order::{order_for_index, OrderAssigner, OrderScope, ORDER_STEP};
use crate::core::parser::{EventSink, StructureEvent};
use crate::error::Result;
use crate::gateway::PersistenceGateway;
use crate::model::{ContentBlock, ContentPayload, DocumentId, Section, SectionId};
use chrono::Utc;
use log::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct OpenSection {
    id: SectionId,
    level: u32,
    section_number: String,
}

impl From<&Section> for OpenSection {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id,
            level: section.level,
            section_number: section.section_number.clone(),
        }
    }
}

/// Counts of what one builder persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub sections: usize,
    pub blocks: usize,
}

/// `parent.N` for nested sections, `N` for roots, where `N = order / 10`.
pub fn section_number(parent: Option<&str>, order: u32) -> String {
    let ordinal = order / ORDER_STEP;
    match parent {
        Some(parent) => format!("{}.{}", parent, ordinal),
        None => ordinal.to_string(),
    }
}

/// Per-document hierarchy state: the stack of open sections from the root to
/// the most recently opened one, plus the synthesized default section used
/// while no heading has been seen.
///
/// Every section and block is written through the gateway as soon as it is
/// created. The builder is dropped when extraction ends.
pub struct HierarchyBuilder<'g, G: PersistenceGateway + ?Sized> {
    gateway: &'g G,
    document_id: DocumentId,
    default_title: String,
    stack: Vec<OpenSection>,
    fallback: Option<OpenSection>,
    summary: BuildSummary,
}

impl<'g, G: PersistenceGateway + ?Sized> HierarchyBuilder<'g, G> {
    pub fn new(gateway: &'g G, document_id: DocumentId, default_title: impl Into<String>) -> Self {
        Self {
            gateway,
            document_id,
            default_title: default_title.into(),
            stack: Vec::new(),
            fallback: None,
            summary: BuildSummary::default(),
        }
    }

    /// Open a section at `level`, nesting it under the nearest open section
    /// with a strictly smaller level.
    pub fn open_section(&mut self, title: impl Into<String>, level: u32) -> Result<Section> {
        while self.stack.last().map_or(false, |top| top.level >= level) {
            self.stack.pop();
        }

        let parent = self.stack.last().cloned();
        let parent_id = parent.as_ref().map(|p| p.id);
        let order = OrderAssigner::new(self.gateway).next_order(OrderScope::Children {
            document_id: self.document_id,
            parent_id,
        })?;

        let section = Section {
            id: Uuid::new_v4(),
            document_id: self.document_id,
            title: title.into(),
            level,
            parent_id,
            order,
            section_number: section_number(
                parent.as_ref().map(|p| p.section_number.as_str()),
                order,
            ),
            created_at: Utc::now(),
        };
        self.gateway.insert_section(&section)?;
        self.summary.sections += 1;

        debug!(
            "Opened section {} '{}' (level {}, depth {})",
            section.section_number,
            section.title,
            level,
            self.stack.len()
        );

        self.stack.push(OpenSection::from(&section));
        Ok(section)
    }

    /// Synthesize a level-0 root section and make it the fallback target for
    /// content until a heading opens.
    pub fn open_default_section(&mut self) -> Result<Section> {
        let order = OrderAssigner::new(self.gateway).next_order(OrderScope::Children {
            document_id: self.document_id,
            parent_id: None,
        })?;

        let section = Section {
            id: Uuid::new_v4(),
            document_id: self.document_id,
            title: self.default_title.clone(),
            level: 0,
            parent_id: None,
            order,
            section_number: section_number(None, order),
            created_at: Utc::now(),
        };
        self.gateway.insert_section(&section)?;
        self.summary.sections += 1;

        debug!("Synthesized default section {}", section.section_number);

        self.fallback = Some(OpenSection::from(&section));
        Ok(section)
    }

    /// The innermost open section, synthesizing a default one if content
    /// arrives before any section exists.
    pub fn current_section(&mut self) -> Result<SectionId> {
        if let Some(top) = self.stack.last() {
            return Ok(top.id);
        }
        if let Some(fallback) = &self.fallback {
            return Ok(fallback.id);
        }
        Ok(self.open_default_section()?.id)
    }

    /// Attach `payload` to the current section at the next free order.
    pub fn append_content(&mut self, payload: ContentPayload) -> Result<ContentBlock> {
        let section_id = self.current_section()?;
        let order = OrderAssigner::new(self.gateway).next_order(OrderScope::Contents { section_id })?;
        self.insert_block(section_id, order, payload)
    }

    /// Attach `payload` to the current section at a caller-chosen order.
    pub fn append_content_at(&mut self, order: u32, payload: ContentPayload) -> Result<ContentBlock> {
        let section_id = self.current_section()?;
        self.insert_block(section_id, order, payload)
    }

    fn insert_block(
        &mut self,
        section_id: SectionId,
        order: u32,
        payload: ContentPayload,
    ) -> Result<ContentBlock> {
        let block = ContentBlock::new(self.document_id, section_id, order, payload);
        self.gateway.insert_content(&block)?;
        self.summary.blocks += 1;
        Ok(block)
    }

    /// Discard the open-section stack.
    pub fn finish(self) -> BuildSummary {
        self.summary
    }
}

impl<G: PersistenceGateway + ?Sized> EventSink for HierarchyBuilder<'_, G> {
    fn emit(&mut self, event: StructureEvent) -> Result<()> {
        match event {
            StructureEvent::Heading { level, title } => {
                self.open_section(title, level)?;
            }
            StructureEvent::Text(text) => {
                self.append_content(ContentPayload::text(text))?;
            }
            StructureEvent::Table(table) => {
                self.append_content(ContentPayload::Table(table))?;
            }
            StructureEvent::Page { index, text } => {
                self.append_content_at(order_for_index(index), ContentPayload::text(text))?;
            }
            StructureEvent::DefaultSection => {
                self.open_default_section()?;
            }
        }
        Ok(())
    }
}
