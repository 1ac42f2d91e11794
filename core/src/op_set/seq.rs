//! Sequence: element order of a list object (RGA)
//!
//! Every insert names the element it was inserted after (its origin), which
//! implicitly builds a tree rooted at [`ElemId::Head`]. Document order is the
//! pre-order traversal of that tree, visiting siblings in descending `OpId`
//! order, so the newest insert at a position comes first.
//!
//! Instead of rebuilding the tree on every merge, the order is maintained
//! incrementally: a new element is placed directly after its origin, then
//! moved right past every following element with a greater id.
//!
//! This relies on every descendant carrying a higher Lamport counter than
//! its ancestors: the scan skips exactly the origin's newer children and
//! their subtrees, whatever order the inserts arrived in.

use crate::error::{DocError, Result};
use crate::types::{ElemId, OpId};

/// Element order of a list, including tombstoned elements
#[derive(Debug, Clone, Default)]
pub(crate) struct Sequence {
    order: Vec<OpId>,
}

impl Sequence {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Integrate a new element inserted after `origin`
    ///
    /// Returns the element's position in the full (tombstone-inclusive) order.
    pub(crate) fn insert(&mut self, origin: &ElemId, id: OpId) -> Result<usize> {
        if let Some(existing) = self.position(&id) {
            return Ok(existing);
        }

        let mut pos = match origin {
            ElemId::Head => 0,
            ElemId::Elem(origin_id) => {
                self.position(origin_id)
                    .ok_or_else(|| DocError::MissingOp(origin_id.clone()))?
                    + 1
            }
        };

        while pos < self.order.len() && self.order[pos] > id {
            pos += 1;
        }

        self.order.insert(pos, id);
        Ok(pos)
    }

    /// Position of an element in the full order
    pub(crate) fn position(&self, id: &OpId) -> Option<usize> {
        self.order.iter().position(|e| e == id)
    }

    pub(crate) fn contains(&self, id: &OpId) -> bool {
        self.position(id).is_some()
    }

    /// All elements in document order, tombstones included
    pub(crate) fn iter(&self) -> impl Iterator<Item = &OpId> {
        self.order.iter()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
