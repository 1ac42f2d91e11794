//! Synchronization: causality tracking and change exchange
//!
//! Replicas exchange [`Change`]s. A replica that knows another's heads can
//! compute exactly the changes the other lacks with
//! [`Document::get_changes`], send them, and the receiver applies them with
//! [`Document::apply_changes`].

mod clock;

pub use clock::{LamportClock, VectorClock};

use crate::change::{Change, ChangeHash};
use crate::document::Document;
use std::collections::BTreeSet;
use std::sync::Arc;

impl Document {
    /// Changes not covered by `have_deps`
    ///
    /// Returns every applied change that is neither one of `have_deps` nor
    /// an ancestor of one, in application order. Unknown hashes in
    /// `have_deps` are ignored, so an empty slice returns the whole history.
    pub fn get_changes(&self, have_deps: &[ChangeHash]) -> Vec<Arc<Change>> {
        let known = self.ancestors(have_deps);
        self.changes()
            .iter()
            .filter(|change| !known.contains(&change.hash()))
            .cloned()
            .collect()
    }

    /// Changes `other` has applied that this document lacks, in `other`'s order
    pub fn get_changes_added(&self, other: &Document) -> Vec<Arc<Change>> {
        other
            .changes()
            .iter()
            .filter(|change| !self.has_change(&change.hash()))
            .cloned()
            .collect()
    }

    /// Hashes among `heads` that this document has not applied, sorted
    ///
    /// Applied changes always have their dependencies present, so only the
    /// given heads can be missing.
    pub fn get_missing_deps(&self, heads: &[ChangeHash]) -> Vec<ChangeHash> {
        heads
            .iter()
            .filter(|hash| !self.has_change(hash))
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The given changes plus everything they transitively depend on
    fn ancestors(&self, hashes: &[ChangeHash]) -> BTreeSet<ChangeHash> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<ChangeHash> = hashes.to_vec();

        while let Some(hash) = stack.pop() {
            let Some(change) = self.get_change(&hash) else {
                continue;
            };
            if seen.insert(hash) {
                stack.extend(change.deps.iter().copied());
            }
        }
        seen
    }
}
