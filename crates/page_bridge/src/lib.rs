//! WebSocket bridge to the in-page shim.
//!
//! The shim injected into the observed page owns the actual host-library
//! calls; this crate speaks a small JSON protocol with it over one
//! WebSocket connection and exposes the result behind the `page_host`
//! traits and the collector's `SnapshotSink`.

pub mod bridge;
pub mod protocol;

pub use bridge::{BridgeChannels, WsPageBridge};
pub use protocol::{PageMessage, ProbeResult, ServiceMessage};
