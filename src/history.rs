//! Undo/redo history of node snapshots.
//!
//! Each [`Edit`] lists the nodes it touched with their records before and
//! after. Undo replays the `before` snapshots in reverse order, redo replays
//! the `after` snapshots in order.

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{NodeId, NodeRecord, NodeRepository};

/// Maximum number of edits kept. The oldest edits are dropped beyond this.
pub const MAX_HISTORY: usize = 100;

/// One node's state on either side of an edit. `None` means "absent".
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub id: NodeId,
    pub before: Option<NodeRecord>,
    pub after: Option<NodeRecord>,
}

/// An atomic, undoable edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub label: &'static str,
    pub changes: Vec<Change>,
}

impl Edit {
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            changes: Vec::new(),
        }
    }

    /// Records a node that did not exist before the edit.
    #[must_use]
    pub fn added(mut self, id: NodeId, record: NodeRecord) -> Self {
        self.changes.push(Change {
            id,
            before: None,
            after: Some(record),
        });
        self
    }

    /// Records a node that was modified.
    #[must_use]
    pub fn updated(mut self, id: NodeId, before: NodeRecord, after: NodeRecord) -> Self {
        self.changes.push(Change {
            id,
            before: Some(before),
            after: Some(after),
        });
        self
    }

    /// Records a node that was removed.
    #[must_use]
    pub fn removed(mut self, id: NodeId, record: NodeRecord) -> Self {
        self.changes.push(Change {
            id,
            before: Some(record),
            after: None,
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// A bounded linear undo/redo stack.
///
/// Pushing after an undo discards the redo branch.
#[derive(Debug)]
pub struct History {
    edits: Vec<Edit>,
    /// Edits at `[0..cursor]` are undoable, `[cursor..]` redoable.
    cursor: usize,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity_limit(MAX_HISTORY)
    }

    /// A history keeping at most `max_size` edits (at least one).
    #[must_use]
    pub fn with_capacity_limit(max_size: usize) -> Self {
        Self {
            edits: Vec::new(),
            cursor: 0,
            max_size: max_size.max(1),
        }
    }

    /// Pushes an edit. Empty edits are ignored.
    pub fn push(&mut self, edit: Edit) {
        if edit.is_empty() {
            return;
        }
        debug!(label = edit.label, changes = edit.changes.len(), "history push");
        self.edits.truncate(self.cursor);
        self.edits.push(edit);
        if self.edits.len() > self.max_size {
            let excess = self.edits.len() - self.max_size;
            self.edits.drain(0..excess);
        }
        self.cursor = self.edits.len();
    }

    /// Reverts the most recent edit. Returns `false` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository rejects a replayed snapshot. Changes
    /// already replayed are rolled back and the cursor is left unchanged.
    pub fn undo<R: NodeRepository + ?Sized>(&mut self, repo: &mut R) -> Result<bool> {
        if self.cursor == 0 {
            return Ok(false);
        }
        let edit = &self.edits[self.cursor - 1];
        replay(repo, edit, Side::Before)?;
        debug!(label = edit.label, "undo");
        self.cursor -= 1;
        Ok(true)
    }

    /// Re-applies the next edit. Returns `false` when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository rejects a replayed snapshot. Changes
    /// already replayed are rolled back and the cursor is left unchanged.
    pub fn redo<R: NodeRepository + ?Sized>(&mut self, repo: &mut R) -> Result<bool> {
        let Some(edit) = self.edits.get(self.cursor) else {
            return Ok(false);
        };
        replay(repo, edit, Side::After)?;
        debug!(label = edit.label, "redo");
        self.cursor += 1;
        Ok(true)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.edits.len()
    }

    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.edits.len() - self.cursor
    }

    /// The edit that the next undo would revert.
    #[must_use]
    pub fn last(&self) -> Option<&Edit> {
        self.cursor.checked_sub(1).and_then(|i| self.edits.get(i))
    }

    pub fn clear(&mut self) {
        self.edits.clear();
        self.cursor = 0;
    }
}

/// Which snapshot of a [`Change`] to replay.
#[derive(Debug, Clone, Copy)]
enum Side {
    Before,
    After,
}

impl Side {
    fn of(self, change: &Change) -> Option<&NodeRecord> {
        match self {
            Self::Before => change.before.as_ref(),
            Self::After => change.after.as_ref(),
        }
    }

    fn opposite(self) -> Self {
        match self {
            Self::Before => Self::After,
            Self::After => Self::Before,
        }
    }
}

/// Replays one side of every change in `edit`, all or nothing.
///
/// `before` runs in reverse order, `after` in order. If a change fails, the
/// ones already replayed are put back to the other side, newest first.
fn replay<R: NodeRepository + ?Sized>(repo: &mut R, edit: &Edit, side: Side) -> Result<()> {
    let order: Vec<&Change> = match side {
        Side::Before => edit.changes.iter().rev().collect(),
        Side::After => edit.changes.iter().collect(),
    };
    for (i, change) in order.iter().enumerate() {
        let Err(err) = apply(repo, change.id, side.of(change)) else {
            continue;
        };
        for done in order[..i].iter().rev() {
            if let Err(rollback) = apply(repo, done.id, side.opposite().of(done)) {
                warn!(id = ?done.id, error = %rollback, "history rollback failed");
            }
        }
        warn!(label = edit.label, error = %err, "history replay aborted");
        return Err(err);
    }
    Ok(())
}

/// Brings node `id` to `target`, whatever its current state.
fn apply<R: NodeRepository + ?Sized>(
    repo: &mut R,
    id: NodeId,
    target: Option<&NodeRecord>,
) -> Result<()> {
    let live = repo.node(id).is_some();
    match (target, live) {
        (Some(record), true) => {
            repo.update_node(id, record.clone())?;
        }
        (Some(record), false) => repo.restore_node(id, record.clone())?,
        (None, true) => {
            repo.delete_node(id)?;
        }
        (None, false) => warn!(?id, "history replay: node already absent"),
    }
    Ok(())
}
