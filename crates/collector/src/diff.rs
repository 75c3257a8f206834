//! Snapshot differ: owns the last published snapshot and suppresses
//! publication when a pass produced no structural change.

use crate::schema::Snapshot;

/// Single-writer cell holding the last published snapshot.
///
/// Collection passes rebuild the snapshot from the full event log every
/// time, so most passes reproduce the previous value; this cell keeps those
/// passes from re-notifying downstream consumers. All writes go through the
/// one service task that owns the cell.
#[derive(Debug, Default)]
pub struct SnapshotCell {
    last: Option<Snapshot>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `next` and return it when it differs structurally from the last
    /// published snapshot. An unchanged snapshot is dropped and the previous
    /// value kept as-is.
    pub fn replace_if_changed(&mut self, next: Snapshot) -> Option<&Snapshot> {
        if self.last.as_ref() == Some(&next) {
            return None;
        }
        self.last = Some(next);
        self.last.as_ref()
    }

    /// Forget the last published snapshot so the next pass republishes even
    /// an identical result. Used by the clear command.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Last published snapshot, if any.
    pub fn last(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }
}
