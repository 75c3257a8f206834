//! In-memory snapshot store.
//!
//! Stands in for the display surface's persisted storage: holds at most one
//! published artifact, replaced wholesale on publish and dropped on clear.
//! Embedders read it back with [`MemorySnapshotStore::get`]; tests use the
//! publish/clear counters.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use collector::schema::Snapshot;
use collector::sink::SnapshotSink;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One stored artifact: the snapshot plus its publication time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSnapshot {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub published_at: DateTime<Utc>,
}

/// Shared in-memory store for the latest published snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    current: RwLock<Option<StoredSnapshot>>,
    publishes: AtomicU64,
    clears: AtomicU64,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest stored artifact, if any.
    pub async fn get(&self) -> Option<StoredSnapshot> {
        self.inner.current.read().await.clone()
    }

    pub fn publish_count(&self) -> u64 {
        self.inner.publishes.load(Ordering::Relaxed)
    }

    pub fn clear_count(&self) -> u64 {
        self.inner.clears.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SnapshotSink for MemorySnapshotStore {
    async fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        let stored = StoredSnapshot {
            snapshot: snapshot.clone(),
            published_at: Utc::now(),
        };
        *self.inner.current.write().await = Some(stored);
        self.inner.publishes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.current.write().await = None;
        self.inner.clears.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
