//! Trends upstream request and response types.
//!
//! Widget-data endpoints are driven by the `token` and `request` of the
//! widgets returned from `explore`; the `request` object is passed back
//! verbatim as the `req` parameter, so it stays an untyped JSON value.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// explore
// ---------------------------------------------------------------------------

/// The `req` payload of the `explore` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreRequest<'a> {
    pub comparison_item: Vec<ComparisonItem<'a>>,
    pub category: u32,
    pub property: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ComparisonItem<'a> {
    pub keyword: &'a str,
    pub time: &'a str,
    pub geo: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ExploreResponse {
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub request: serde_json::Value,
}

impl Widget {
    /// The keyword a per-term widget is restricted to, if any.
    #[must_use]
    pub fn restriction_keyword(&self) -> Option<&str> {
        self.request
            .pointer("/restriction/complexKeywordsRestriction/keyword/0/value")
            .and_then(serde_json::Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// widgetdata/multiline
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MultilineResponse {
    pub default: MultilineData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultilineData {
    #[serde(default)]
    pub timeline_data: Vec<TimelinePoint>,
}

/// One bucket of the interest-over-time timeline.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// Bucket start as unix seconds, encoded as a string.
    pub time: String,
    #[serde(default)]
    pub value: Vec<u32>,
    /// Set on the trailing bucket while it is still being collected.
    #[serde(default)]
    pub is_partial: bool,
}

// ---------------------------------------------------------------------------
// widgetdata/relatedsearches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RelatedSearchesResponse {
    pub default: RelatedSearchesData,
}

/// `ranked_list[0]` holds the top queries, `ranked_list[1]` the rising ones.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSearchesData {
    #[serde(default)]
    pub ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedList {
    #[serde(default)]
    pub ranked_keyword: Vec<RankedKeyword>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedKeyword {
    pub query: String,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub formatted_value: String,
}
