//! Core traits abstracting the host page's libraries.

use crate::types::{AuctionEvent, SlotHandle};
use anyhow::Result;
use async_trait::async_trait;

/// The page's header bidding library (auction side).
#[async_trait]
pub trait AuctionProvider: Send + Sync {
    /// Capability probe: the library is loaded and exposes its event log.
    async fn is_ready(&self) -> bool;

    /// Full event log, oldest first. Every call re-reads from scratch; the
    /// collector diffs the derived snapshots instead of tracking deltas.
    async fn events(&self) -> Result<Vec<AuctionEvent>>;

    /// Run a new auction scoped to the given ad-unit codes.
    ///
    /// Resolves only once the library reports bids back, so callers can
    /// sequence follow-up work (such as an ad-server refresh) after it.
    /// No timeout is applied here; see the refresh orchestrator.
    async fn request_bids(&self, ad_unit_codes: Vec<String>) -> Result<()>;
}

/// The page's tag-serving library (ad server side).
#[async_trait]
pub trait AdServer: Send + Sync {
    /// Capability probe: the library is loaded and exposes its slot registry.
    async fn is_ready(&self) -> bool;

    /// All currently registered slots, in registration order.
    async fn slots(&self) -> Result<Vec<SlotHandle>>;

    /// Re-serve creative for the given slots.
    async fn refresh(&self, slots: &[SlotHandle]) -> Result<()>;
}
