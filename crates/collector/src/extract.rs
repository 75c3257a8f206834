//! Extraction normalizer: turns the raw auction event log into canonical
//! per-bid records.

use crate::schema::ParamEntry;
use page_host::AuctionEvent;
use serde_json::Value;
use tracing::trace;

/// Parameter keys never shown in the inspector: keyword lists, custom
/// payloads, video blobs, deal/transaction identifiers, floor prices and
/// page-view identifiers. Static denylist, not configurable.
pub const EXCLUDED_PARAM_KEYS: &[&str] = &[
    "keywords",
    "customData",
    "video",
    "dctr",
    "wiid",
    "floor",
    "floorPrice",
    "pageviewId",
];

/// Canonical record for one valid bid request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidRecord {
    pub partner: String,
    pub slot: String,
    pub params: Vec<ParamEntry>,
    pub media_types: Option<String>,
}

/// Flatten the full event log into canonical bid records, in event order.
///
/// Bids missing a non-empty partner, a non-empty slot, or a parameter object
/// are dropped here. That is filtering policy, not failure: a malformed bid
/// never aborts the pass or affects its neighbors.
pub fn normalize_events(events: &[AuctionEvent]) -> Vec<BidRecord> {
    let mut records = Vec::new();
    for event in events.iter().filter(|e| e.is_bid_request()) {
        for bid in &event.args.bids {
            match normalize_bid(bid, event.args.media_types.as_ref()) {
                Some(record) => records.push(record),
                None => trace!(?bid, "skipping malformed bid entry"),
            }
        }
    }
    records
}

fn normalize_bid(bid: &Value, event_media_types: Option<&Value>) -> Option<BidRecord> {
    let partner = non_empty_str(bid.get("bidder"))?;
    let slot = non_empty_str(bid.get("adUnitCode"))?;
    let params = bid.get("params")?.as_object()?;

    let params = params
        .iter()
        .filter(|(key, _)| !EXCLUDED_PARAM_KEYS.contains(&key.as_str()))
        .map(|(key, value)| ParamEntry {
            name: key.clone(),
            value: display_value(value),
        })
        .collect();

    // A bid without its own media types inherits the event-level descriptor.
    let media_types = bid
        .get("mediaTypes")
        .filter(|v| is_truthy(v))
        .or(event_media_types)
        .and_then(media_summary);

    Some(BidRecord {
        partner: partner.to_string(),
        slot: slot.to_string(),
        params,
        media_types,
    })
}

/// Summarize a media-type descriptor as e.g. "banner, video(instream), native".
///
/// Lookups into host data are defensive throughout: anything that is not the
/// expected shape just drops that part of the summary.
fn media_summary(media_types: &Value) -> Option<String> {
    let obj = media_types.as_object()?;
    let mut parts = Vec::new();

    if obj.get("banner").is_some_and(is_truthy) {
        parts.push("banner".to_string());
    }
    if let Some(video) = obj.get("video").filter(|v| is_truthy(v)) {
        let mut label = "video".to_string();
        if let Some(context) = video_context(video) {
            label.push('(');
            label.push_str(&context);
            label.push(')');
        }
        parts.push(label);
    }
    if obj.get("native").is_some_and(is_truthy) {
        parts.push("native".to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Context label for a video descriptor, from `context` or, failing that,
/// `playerParams.context`.
fn video_context(video: &Value) -> Option<String> {
    video
        .get("context")
        .filter(|v| is_truthy(v))
        .or_else(|| {
            video
                .get("playerParams")
                .and_then(|p| p.get("context"))
                .filter(|v| is_truthy(v))
        })
        .map(display_value)
}

/// JS-style truthiness for the host's loosely typed descriptors.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Display form of a parameter value: strings verbatim, everything else as
/// compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
