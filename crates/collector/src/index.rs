//! Index builder: folds canonical bid records into the by-slot and
//! by-partner views of one snapshot.

use crate::extract::BidRecord;
use crate::schema::{RenderFragment, Snapshot};
use std::collections::BTreeMap;

/// Build one snapshot from the records of a full collection pass.
///
/// The by-slot view appends a partner-labeled fragment for every record, so
/// repeated bids all show up. The by-partner view keys fragments by slot and
/// overwrites on repeats, so the last bid for a (partner, slot) pair wins
/// while the sequence keeps the order the slot was first seen for that
/// partner.
pub fn build_snapshot(records: Vec<BidRecord>) -> Snapshot {
    let mut slots: BTreeMap<String, Vec<RenderFragment>> = BTreeMap::new();
    let mut partners: BTreeMap<String, Vec<(String, RenderFragment)>> = BTreeMap::new();

    for record in records {
        let BidRecord {
            partner,
            slot,
            params,
            media_types,
        } = record;

        slots
            .entry(slot.clone())
            .or_default()
            .push(RenderFragment {
                label: partner.clone(),
                params: params.clone(),
                media_types: media_types.clone(),
            });

        let fragment = RenderFragment {
            label: slot.clone(),
            params,
            media_types,
        };
        let entries = partners.entry(partner).or_default();
        if let Some((_, existing)) = entries.iter_mut().find(|(seen, _)| *seen == slot) {
            *existing = fragment;
        } else {
            entries.push((slot, fragment));
        }
    }

    let partners = partners
        .into_iter()
        .map(|(partner, entries)| {
            let fragments = entries.into_iter().map(|(_, fragment)| fragment).collect();
            (partner, fragments)
        })
        .collect();

    Snapshot { slots, partners }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamEntry;

    fn record(partner: &str, slot: &str, params: &[(&str, &str)]) -> BidRecord {
        BidRecord {
            partner: partner.to_string(),
            slot: slot.to_string(),
            params: params
                .iter()
                .map(|(name, value)| ParamEntry {
                    name: (*name).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
            media_types: None,
        }
    }

    #[test]
    fn test_single_bid_lands_in_both_indexes() {
        let snapshot = build_snapshot(vec![record("ssp1", "div-1", &[("size", "300x250")])]);

        let slot_frags = &snapshot.slots["div-1"];
        assert_eq!(slot_frags.len(), 1);
        assert_eq!(slot_frags[0].label, "ssp1");
        assert_eq!(slot_frags[0].params[0].value, "300x250");

        let partner_frags = &snapshot.partners["ssp1"];
        assert_eq!(partner_frags.len(), 1);
        assert_eq!(partner_frags[0].label, "div-1");
        assert_eq!(partner_frags[0].params[0].value, "300x250");
    }

    #[test]
    fn test_repeat_bid_dedups_by_partner_only() {
        let snapshot = build_snapshot(vec![
            record("ssp1", "div-1", &[("size", "300x250")]),
            record("ssp1", "div-1", &[("size", "300x600")]),
        ]);

        // By slot: both bids survive, in order.
        let slot_frags = &snapshot.slots["div-1"];
        assert_eq!(slot_frags.len(), 2);
        assert_eq!(slot_frags[0].params[0].value, "300x250");
        assert_eq!(slot_frags[1].params[0].value, "300x600");

        // By partner: one entry, the later bid.
        let partner_frags = &snapshot.partners["ssp1"];
        assert_eq!(partner_frags.len(), 1);
        assert_eq!(partner_frags[0].params[0].value, "300x600");
    }

    #[test]
    fn test_partner_slot_order_is_first_seen() {
        let snapshot = build_snapshot(vec![
            record("ssp1", "div-2", &[]),
            record("ssp1", "div-1", &[("v", "old")]),
            record("ssp1", "div-2", &[("v", "new")]),
        ]);

        let labels: Vec<&str> = snapshot.partners["ssp1"]
            .iter()
            .map(|f| f.label.as_str())
            .collect();
        assert_eq!(labels, vec!["div-2", "div-1"]);
        assert_eq!(snapshot.partners["ssp1"][0].params[0].value, "new");
    }

    #[test]
    fn test_slot_bucket_keeps_event_order_across_partners() {
        let snapshot = build_snapshot(vec![
            record("ssp2", "div-1", &[]),
            record("ssp1", "div-1", &[]),
            record("ssp3", "div-1", &[]),
        ]);

        let labels: Vec<&str> = snapshot.slots["div-1"]
            .iter()
            .map(|f| f.label.as_str())
            .collect();
        assert_eq!(labels, vec!["ssp2", "ssp1", "ssp3"]);
    }

    #[test]
    fn test_empty_records_build_empty_snapshot() {
        let snapshot = build_snapshot(Vec::new());
        assert!(snapshot.is_empty());
    }
}
