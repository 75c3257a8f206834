//! Collection-and-diff engine for header bidding parameter snapshots.
//!
//! On every auction round the engine re-derives, from the host page's full
//! event log, which configuration parameters each bidding partner submitted
//! for each ad slot, and publishes the result only when it actually changed.
//!
//! # Architecture
//!
//! ```text
//! event log --> extract (normalize bids) --> index (by-slot / by-partner)
//!                                                --> diff --> SnapshotSink
//! ```
//!
//! The [`service::CollectorService`] owns the whole pipeline in a single
//! task: it waits for the host libraries, re-runs the pipeline on every
//! slot-response notification, and handles the clear-and-refresh command via
//! the [`refresh::RefreshOrchestrator`].

pub mod diff;
pub mod extract;
pub mod index;
pub mod refresh;
pub mod schema;
pub mod service;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_support;

pub use diff::SnapshotCell;
pub use extract::{normalize_events, BidRecord, EXCLUDED_PARAM_KEYS};
pub use index::build_snapshot;
pub use refresh::{RefreshOrchestrator, RefreshOutcome, RefreshState};
pub use schema::{ParamEntry, PartnerIndex, RenderFragment, SlotIndex, Snapshot};
pub use service::{CollectorConfig, CollectorService};
pub use sink::SnapshotSink;
