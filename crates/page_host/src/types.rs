//! Wire-shaped types exposed by the host page's libraries.
//!
//! The in-page shim relays these verbatim from the bidding library's event
//! log and the tag-serving library's slot registry, so field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event kind the bidding library emits when bids are requested for a round.
pub const BID_REQUESTED: &str = "bidRequested";

/// One entry of the bidding library's event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionEvent {
    /// Event kind, e.g. "bidRequested", "auctionEnd".
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub args: AuctionEventArgs,
}

/// Payload of an auction event.
///
/// Bids stay raw [`Value`]s here and are recovered bid-by-bid during
/// normalization, so one malformed entry cannot fail the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionEventArgs {
    #[serde(default)]
    pub bids: Vec<Value>,
    /// Event-level media types, used as a fallback for bids that carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Value>,
}

impl AuctionEvent {
    /// Whether this event carries the bids requested for an auction round.
    pub fn is_bid_request(&self) -> bool {
        self.event_type == BID_REQUESTED
    }
}

/// Handle for one ad slot registered with the tag-serving library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotHandle {
    /// DOM element id of the slot container.
    pub element_id: String,
    /// Ad-unit path the slot was defined with.
    pub ad_unit_path: String,
}

/// Notification pushed by the page as the tag-serving library fires events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The ad server answered for one slot; a fresh collection pass is due.
    SlotResponse { element_id: String },
}
