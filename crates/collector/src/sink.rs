//! Outbound seam for publishing snapshots to the display surface's storage.

use crate::schema::Snapshot;
use anyhow::Result;
use async_trait::async_trait;

/// Destination for published snapshots.
///
/// The sink holds at most one artifact: `publish` replaces whatever was
/// stored before, `clear` removes it entirely. The collector only calls
/// `publish` when the differ reported a structural change.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn publish(&self, snapshot: &Snapshot) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}
