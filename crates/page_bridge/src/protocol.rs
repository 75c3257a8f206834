//! JSON protocol spoken with the in-page shim.
//!
//! One connection carries correlated request/response pairs initiated by the
//! service plus unsolicited notifications pushed by the page. Field names
//! are camelCase on the wire to match the shim's JavaScript side.

use collector::schema::Snapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Service → Page Messages
// ============================================================================

/// Message sent from the service to the page shim.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceMessage {
    /// Capability probe: which host libraries are usable right now?
    Probe { id: u64 },
    /// Read the bidding library's full event log.
    GetEvents { id: u64 },
    /// Enumerate the registered ad slots.
    GetSlots { id: u64 },
    /// Run a new auction for the given ad-unit codes. The page answers only
    /// once bids are back.
    #[serde(rename_all = "camelCase")]
    RequestBids { id: u64, ad_unit_codes: Vec<String> },
    /// Re-serve creative for the slots with the given element ids.
    #[serde(rename_all = "camelCase")]
    RefreshSlots { id: u64, element_ids: Vec<String> },
    /// Replace the stored artifact shown by the popup.
    PublishSnapshot { snapshot: Snapshot },
    /// Drop the stored artifact.
    ClearSnapshot,
}

// ============================================================================
// Page → Service Messages
// ============================================================================

/// Message sent from the page shim to the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageMessage {
    /// Answer to a correlated request.
    Response {
        id: u64,
        #[serde(default)]
        ok: bool,
        #[serde(default)]
        payload: Value,
    },
    /// The ad server answered for one slot.
    #[serde(rename_all = "camelCase")]
    SlotResponse { element_id: String },
    /// The popup asked for a clear-and-refresh cycle.
    RefreshRequested,
}

/// Payload of a probe response.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ProbeResult {
    /// The bidding library exposes its event log and bid-request call.
    #[serde(default)]
    pub auction: bool,
    /// The tag-serving library exposes its slot registry and refresh call.
    #[serde(default)]
    pub tags: bool,
}
