//! Snapshot schema: structured render fragments and the two parameter indexes.

use serde::Serialize;
use std::collections::BTreeMap;

/// One displayed parameter, key order preserved from the bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamEntry {
    pub name: String,
    pub value: String,
}

/// One cell of the parameter table: a label (partner or slot id), the
/// filtered parameters and an optional media-type summary.
///
/// Identity lives in the fields. [`RenderFragment::to_html`] is a view for
/// the display surface and is never parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFragment {
    pub label: String,
    pub params: Vec<ParamEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_types: Option<String>,
}

/// Indentation used between parameter lines in the popup markup.
const INDENT: &str = "<br>&nbsp;&nbsp;&nbsp;&nbsp;";

impl RenderFragment {
    /// Render the markup the popup table consumes: highlighted label, one
    /// indented `key: value` line per parameter, then the media types.
    pub fn to_html(&self) -> String {
        let mut out = format!(r#"<span style="color: yellow;">{}</span>"#, self.label);
        out.push_str(INDENT);
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.value))
            .collect();
        out.push_str(&params.join(INDENT));
        if let Some(mt) = &self.media_types {
            out.push_str(INDENT);
            out.push_str("mediatypes: ");
            out.push_str(mt);
        }
        out
    }
}

/// By-slot view: every bid received for the slot this round, in event order.
/// Duplicates are kept on purpose.
pub type SlotIndex = BTreeMap<String, Vec<RenderFragment>>;

/// By-partner view: one fragment per distinct slot the partner bid on,
/// ordered by first sighting of that slot.
pub type PartnerIndex = BTreeMap<String, Vec<RenderFragment>>;

/// The complete by-slot and by-partner view of one auction round.
///
/// Built in full by one collection pass and never patched afterwards; a new
/// pass always produces a full replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub slots: SlotIndex,
    pub partners: PartnerIndex,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.partners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment() -> RenderFragment {
        RenderFragment {
            label: "ssp1".to_string(),
            params: vec![
                ParamEntry {
                    name: "placementId".to_string(),
                    value: "123".to_string(),
                },
                ParamEntry {
                    name: "size".to_string(),
                    value: "300x250".to_string(),
                },
            ],
            media_types: Some("banner, video(instream)".to_string()),
        }
    }

    #[test]
    fn test_to_html_markup() {
        let html = fragment().to_html();
        assert_eq!(
            html,
            "<span style=\"color: yellow;\">ssp1</span>\
             <br>&nbsp;&nbsp;&nbsp;&nbsp;placementId: 123\
             <br>&nbsp;&nbsp;&nbsp;&nbsp;size: 300x250\
             <br>&nbsp;&nbsp;&nbsp;&nbsp;mediatypes: banner, video(instream)"
        );
    }

    #[test]
    fn test_to_html_without_media_types() {
        let mut frag = fragment();
        frag.media_types = None;
        assert!(!frag.to_html().contains("mediatypes"));
    }

    #[test]
    fn test_fragment_identity_is_structural() {
        let a = fragment();
        let mut b = fragment();
        assert_eq!(a, b);
        b.params[0].value = "456".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut snapshot = Snapshot::default();
        snapshot.slots.insert("div-1".to_string(), vec![fragment()]);

        let json = serde_json::to_value(&snapshot).unwrap();
        let frag = &json["slots"]["div-1"][0];
        assert_eq!(frag["label"], "ssp1");
        assert_eq!(frag["mediaTypes"], "banner, video(instream)");
        assert_eq!(frag["params"][0]["name"], "placementId");
    }
}
