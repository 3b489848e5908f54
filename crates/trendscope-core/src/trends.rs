//! Result shapes produced by one trends fetch.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// One sample of the interest-over-time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesRow {
    pub timestamp: DateTime<Utc>,
    /// Relative interest (0–100), one value per term, same order as
    /// [`TimeSeries::terms`].
    pub values: Vec<u32>,
}

/// Chronological interest-over-time series keyed by the query's terms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TimeSeries {
    pub terms: Vec<String>,
    pub rows: Vec<TimeSeriesRow>,
}

impl TimeSeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Score attached to a related query.
///
/// Rising queries whose growth is too large to express as a percentage are
/// reported as [`QueryScore::Breakout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScore {
    Value(u32),
    Breakout,
}

impl std::fmt::Display for QueryScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryScore::Value(v) => write!(f, "{v}"),
            QueryScore::Breakout => f.write_str("Breakout"),
        }
    }
}

impl Serialize for QueryScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueryScore::Value(v) => serializer.serialize_u32(*v),
            QueryScore::Breakout => serializer.serialize_str("Breakout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedQuery {
    pub query: String,
    pub score: QueryScore,
}

/// Top and rising related queries for one term.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RelatedQueryLists {
    pub top: Vec<RelatedQuery>,
    pub rising: Vec<RelatedQuery>,
}

/// Related queries keyed by query term.
pub type RelatedQueries = BTreeMap<String, RelatedQueryLists>;

/// Both halves of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TrendsData {
    pub series: TimeSeries,
    pub related: RelatedQueries,
}

impl TrendsData {
    /// Rising queries for `term`; empty when the term has none.
    #[must_use]
    pub fn rising_for(&self, term: &str) -> &[RelatedQuery] {
        self.related
            .get(term)
            .map_or(&[][..], |lists| lists.rising.as_slice())
    }
}

/// Why a fetch produced no report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailure {
    /// Every attempt was rejected with a rate-limit response.
    RateLimited,
    /// The upstream failed in a way retrying would not fix.
    UpstreamError,
    /// The fetch succeeded but the series has no rows. Assigned by the
    /// presenter, never by the fetcher.
    EmptyResult,
}

impl FetchFailure {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            FetchFailure::RateLimited => "upstream_rate_limited",
            FetchFailure::UpstreamError => "upstream_error",
            FetchFailure::EmptyResult => "no_data",
        }
    }

    /// The single message shown to the user for this failure.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            FetchFailure::RateLimited => {
                "Failed to fetch data after several attempts due to rate limiting."
            }
            FetchFailure::UpstreamError => "Failed to fetch data due to a response error.",
            FetchFailure::EmptyResult => "No data found for the given parameters.",
        }
    }
}

/// Terminal result of a fetch. There is no partial success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(TrendsData),
    Failure(FetchFailure),
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn series() -> TimeSeries {
        TimeSeries {
            terms: vec!["abortion".to_string(), "roe".to_string()],
            rows: vec![
                TimeSeriesRow {
                    timestamp: Utc.timestamp_opt(1_672_531_200, 0).unwrap(),
                    values: vec![54, 12],
                },
                TimeSeriesRow {
                    timestamp: Utc.timestamp_opt(1_673_136_000, 0).unwrap(),
                    values: vec![61, 9],
                },
            ],
        }
    }

    #[test]
    fn series_length_counts_rows_not_terms() {
        let s = series();
        assert_eq!(s.len(), 2);
        assert!(!s.is_empty());
        assert!(TimeSeries::default().is_empty());
    }

    #[test]
    fn breakout_serializes_as_marker_string() {
        let q = RelatedQuery {
            query: "abortion pill".to_string(),
            score: QueryScore::Breakout,
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["score"], "Breakout");

        let q = RelatedQuery {
            query: "roe v wade".to_string(),
            score: QueryScore::Value(350),
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["score"], 350);
    }

    #[test]
    fn rising_for_missing_term_is_empty() {
        let data = TrendsData::default();
        assert!(data.rising_for("abortion").is_empty());
    }

    #[test]
    fn failure_codes_and_messages_are_distinct() {
        let all = [
            FetchFailure::RateLimited,
            FetchFailure::UpstreamError,
            FetchFailure::EmptyResult,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
                assert_ne!(a.message(), b.message());
            }
        }
        assert_eq!(FetchFailure::EmptyResult.code(), "no_data");
    }
}
