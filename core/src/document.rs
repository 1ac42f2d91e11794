//! Document: versioned handle to a replicated JSON-like document
//!
//! A [`Document`] is never modified in place through the public API:
//! [`Document::change`], [`Document::merge`] and friends take `&self` and
//! return a new handle, so earlier handles stay valid snapshots.
//!
//! Internally a document is its change history plus the materialized
//! [`OpSet`]. Merging applies the other side's unknown changes in causal
//! order; since visible state is a function of the set of applied ops, any
//! two documents holding the same changes read identically.

use crate::change::{Change, ChangeHash};
use crate::config::{random_actor, InitOptions};
use crate::error::{DocError, Result};
use crate::history::HistoryEntry;
use crate::op_set::OpSet;
use crate::read::ReadDoc;
use crate::sync::{LamportClock, VectorClock};
use crate::time::Clock;
use crate::transaction::Transaction;
use crate::ActorId;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// A replicated document
///
/// # Example
///
/// ```rust
/// use convergent_core::{Document, ReadDoc, ROOT};
///
/// let doc1 = Document::new()
///     .change("Set title", |tx| tx.put(&ROOT, "title", "Hello"))
///     .unwrap();
///
/// let doc2 = Document::new()
///     .merge(&doc1)
///     .unwrap()
///     .change("Set author", |tx| tx.put(&ROOT, "author", "Ada"))
///     .unwrap();
///
/// let merged = doc1.merge(&doc2).unwrap();
/// assert_eq!(merged.to_json(), serde_json::json!({"author": "Ada", "title": "Hello"}));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    actor: ActorId,
    op_set: OpSet,

    /// Applied changes in application order (always causally ordered)
    history: Vec<Arc<Change>>,

    /// Change hash -> position in `history`
    index: HashMap<ChangeHash, usize>,

    /// Changes no other applied change depends on
    heads: BTreeSet<ChangeHash>,

    /// Highest applied sequence number per actor
    clock: VectorClock,

    /// Highest op counter seen
    max_op: LamportClock,

    time: Arc<dyn Clock>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a random actor
    pub fn new() -> Self {
        Self::with_options(InitOptions::default())
    }

    /// Create an empty document attributed to `actor`
    pub fn with_actor(actor: impl Into<ActorId>) -> Self {
        Self::with_options(InitOptions::new().with_actor(actor))
    }

    /// Create an empty document from options
    pub fn with_options(options: InitOptions) -> Self {
        Self {
            actor: options.actor_or_random(),
            op_set: OpSet::new(),
            history: Vec::new(),
            index: HashMap::new(),
            heads: BTreeSet::new(),
            clock: VectorClock::new(),
            max_op: LamportClock::new(),
            time: options.clock_or_system(),
        }
    }

    /// Empty document sharing this one's actor and time source
    pub(crate) fn empty_like(&self) -> Self {
        Self::with_options(
            InitOptions::new()
                .with_actor(self.actor.clone())
                .with_clock(self.time.clone()),
        )
    }

    /// Actor local changes are attributed to
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Copy of this document attributed to a new random actor
    pub fn fork(&self) -> Self {
        let mut forked = self.clone();
        forked.actor = random_actor();
        forked
    }

    /// Copy of this document attributed to `actor`
    pub fn fork_with_actor(&self, actor: impl Into<ActorId>) -> Self {
        let mut forked = self.clone();
        forked.actor = actor.into();
        forked
    }

    /// Hashes of the changes no other change depends on, sorted
    pub fn heads(&self) -> Vec<ChangeHash> {
        self.heads.iter().copied().collect()
    }

    /// All applied changes in application order
    pub fn changes(&self) -> &[Arc<Change>] {
        &self.history
    }

    /// Number of applied changes
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Look up an applied change
    pub fn get_change(&self, hash: &ChangeHash) -> Option<&Arc<Change>> {
        self.index.get(hash).map(|&i| &self.history[i])
    }

    /// Whether a change has been applied
    pub fn has_change(&self, hash: &ChangeHash) -> bool {
        self.index.contains_key(hash)
    }

    /// Per-actor sequence numbers applied so far
    pub fn vector_clock(&self) -> &VectorClock {
        &self.clock
    }

    /// Make a change
    ///
    /// Runs `f` against a [`Transaction`] on a copy of this document and
    /// records exactly one new change tagged with `message`, even if `f`
    /// performs no writes. `self` is left untouched; if `f` fails nothing is
    /// recorded and the error is returned.
    pub fn change<F>(&self, message: impl Into<String>, f: F) -> Result<Document>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<()>,
    {
        self.change_with(message, f).map(|(doc, ())| doc)
    }

    /// Make a change and also return the closure's result
    pub fn change_with<F, T>(&self, message: impl Into<String>, f: F) -> Result<(Document, T)>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let mut next = self.clone();
        let start_op = next.max_op.value() + 1;

        let (ops, value) = {
            let mut tx = Transaction::new(&mut next.op_set, next.actor.clone(), next.max_op);
            let value = f(&mut tx)?;
            (tx.into_ops(), value)
        };

        let change = Change::new(
            next.actor.clone(),
            next.clock.get(&next.actor) + 1,
            start_op,
            next.time.now_millis(),
            Some(message.into()),
            next.heads(),
            ops,
        )?;

        debug!(
            actor = %change.actor,
            seq = change.seq,
            ops = change.ops.len(),
            hash = %change.hash(),
            total_ops = next.op_set.op_count(),
            "Committed change"
        );

        next.record(Arc::new(change));
        Ok((next, value))
    }

    /// Merge another document into a copy of this one
    ///
    /// The result keeps this document's actor and holds every change of both
    /// inputs. Merging is commutative, associative and idempotent with
    /// respect to the visible state.
    pub fn merge(&self, other: &Document) -> Result<Document> {
        let mut next = self.clone();
        let applied = next.apply_in_place(other.history.iter().cloned())?;

        debug!(
            local = %self.actor,
            remote = %other.actor,
            applied,
            heads = next.heads.len(),
            "Merged documents"
        );
        Ok(next)
    }

    /// Apply changes received from elsewhere to a copy of this document
    ///
    /// Changes may arrive in any order; they are applied once all their
    /// dependencies are present. Already-applied changes are skipped.
    pub fn apply_changes<I>(&self, changes: I) -> Result<Document>
    where
        I: IntoIterator<Item = Arc<Change>>,
    {
        let mut next = self.clone();
        let applied = next.apply_in_place(changes)?;
        debug!(actor = %self.actor, applied, "Applied changes");
        Ok(next)
    }

    /// Every change paired with the document state right after it
    ///
    /// Snapshots are rebuilt by replaying the history and each entry holds a
    /// full copy of the document, so memory grows quadratically with the
    /// number of changes. Use [`Document::changes`] when only the change
    /// metadata is needed.
    pub fn get_history(&self) -> Result<Vec<HistoryEntry>> {
        let mut replay = self.empty_like();
        let mut entries = Vec::with_capacity(self.history.len());

        for change in &self.history {
            replay.apply_change(change.clone())?;
            entries.push(HistoryEntry {
                change: change.clone(),
                snapshot: replay.clone(),
            });
        }
        Ok(entries)
    }

    /// Apply changes in causal order, returning how many were new
    pub(crate) fn apply_in_place<I>(&mut self, changes: I) -> Result<usize>
    where
        I: IntoIterator<Item = Arc<Change>>,
    {
        let mut pending: Vec<Arc<Change>> = Vec::new();
        let mut seen = BTreeSet::new();
        for change in changes {
            if !self.has_change(&change.hash()) && seen.insert(change.hash()) {
                pending.push(change);
            }
        }

        let mut applied = 0;
        while !pending.is_empty() {
            let before = pending.len();
            let mut blocked = Vec::new();

            for change in pending {
                if change.deps.iter().all(|dep| self.has_change(dep)) {
                    self.apply_change(change)?;
                    applied += 1;
                } else {
                    blocked.push(change);
                }
            }

            if blocked.len() == before {
                let change = &blocked[0];
                let missing: Vec<ChangeHash> = change
                    .deps
                    .iter()
                    .filter(|dep| !self.has_change(dep))
                    .copied()
                    .collect();
                warn!(hash = %change.hash(), missing = missing.len(), "Change has unmet dependencies");
                return Err(DocError::MissingDependencies {
                    hash: change.hash(),
                    missing,
                });
            }
            pending = blocked;
        }

        Ok(applied)
    }

    /// Apply one change whose dependencies are all present
    pub(crate) fn apply_change(&mut self, change: Arc<Change>) -> Result<()> {
        let expected = self.clock.get(&change.actor) + 1;
        if change.seq < expected {
            warn!(actor = %change.actor, seq = change.seq, "Sequence number reused");
            return Err(DocError::DuplicateSeq {
                actor: change.actor.clone(),
                seq: change.seq,
            });
        }
        if change.seq > expected {
            warn!(actor = %change.actor, seq = change.seq, expected, "Sequence number gap");
            return Err(DocError::SeqGap {
                actor: change.actor.clone(),
                expected,
                got: change.seq,
            });
        }

        for (id, op) in change.iter_ops() {
            self.op_set.apply(&id, op)?;
        }
        self.record(change);
        Ok(())
    }

    /// Add an applied change to the history bookkeeping
    fn record(&mut self, change: Arc<Change>) {
        for dep in &change.deps {
            self.heads.remove(dep);
        }
        self.heads.insert(change.hash());
        self.clock.update(&change.actor, change.seq);
        self.max_op.update(change.max_op());
        self.index.insert(change.hash(), self.history.len());
        self.history.push(change);
    }
}

impl ReadDoc for Document {
    fn op_set(&self) -> &OpSet {
        &self.op_set
    }
}
