//! Next-order computation for sibling scopes.
//!
//! Orders step by [`ORDER_STEP`] starting at [`ORDER_STEP`], leaving gaps for
//! later insertion. The lookup reads the persisted maximum, so a value must be
//! persisted before the next one is requested for the same scope. Two writers
//! sharing a scope can race and obtain the same value; callers keep to one
//! producer per document.

use crate::gateway::{GatewayResult, PersistenceGateway};
use crate::model::{DocumentId, SectionId};

pub const ORDER_STEP: u32 = 10;

/// A sibling scope in which order values are unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Child sections of `parent_id` (root sections when `None`).
    Children {
        document_id: DocumentId,
        parent_id: Option<SectionId>,
    },
    /// Content list of a section.
    Contents { section_id: SectionId },
}

pub struct OrderAssigner<'g, G: PersistenceGateway + ?Sized> {
    gateway: &'g G,
}

impl<'g, G: PersistenceGateway + ?Sized> OrderAssigner<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// `max + ORDER_STEP` for the scope, or `ORDER_STEP` when it is empty.
    pub fn next_order(&self, scope: OrderScope) -> GatewayResult<u32> {
        let last = match scope {
            OrderScope::Children {
                document_id,
                parent_id,
            } => self.gateway.last_child_order(document_id, parent_id)?,
            OrderScope::Contents { section_id } => self.gateway.last_content_order(section_id)?,
        };
        Ok(last.map_or(ORDER_STEP, |max| max + ORDER_STEP))
    }
}

/// Order of the `index`-th (zero-based) entry of a sequentially filled scope.
pub fn order_for_index(index: usize) -> u32 {
    (index as u32 + 1) * ORDER_STEP
}
