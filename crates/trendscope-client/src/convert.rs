//! Conversion from upstream response types into the shared result model.

use chrono::{DateTime, Utc};
use trendscope_core::{QueryScore, RelatedQuery, RelatedQueryLists, TimeSeries, TimeSeriesRow};

use crate::error::TrendsError;
use crate::types::{RankedKeyword, RelatedSearchesData, TimelinePoint};

const BREAKOUT_MARKER: &str = "Breakout";

/// Builds the series for `terms`, dropping the upstream partial-bucket flag.
///
/// # Errors
///
/// Returns [`TrendsError::Malformed`] if a timestamp is not unix seconds or a
/// point does not carry exactly one value per term.
pub(crate) fn timeline_to_series(
    terms: &[String],
    points: Vec<TimelinePoint>,
) -> Result<TimeSeries, TrendsError> {
    let mut rows = Vec::with_capacity(points.len());
    for point in points {
        if point.value.len() != terms.len() {
            return Err(TrendsError::Malformed(format!(
                "timeline point {} has {} values for {} terms",
                point.time,
                point.value.len(),
                terms.len()
            )));
        }
        rows.push(TimeSeriesRow {
            timestamp: parse_unix_seconds(&point.time)?,
            values: point.value,
        });
    }
    rows.sort_by_key(|row| row.timestamp);

    Ok(TimeSeries {
        terms: terms.to_vec(),
        rows,
    })
}

fn parse_unix_seconds(raw: &str) -> Result<DateTime<Utc>, TrendsError> {
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| TrendsError::Malformed(format!("invalid timeline timestamp \"{raw}\"")))
}

/// Splits a related-searches payload into its top and rising lists.
pub(crate) fn ranked_lists(data: RelatedSearchesData) -> RelatedQueryLists {
    let mut lists = data.ranked_list.into_iter();
    let top = lists.next().map(|l| convert_keywords(l.ranked_keyword));
    let rising = lists.next().map(|l| convert_keywords(l.ranked_keyword));
    RelatedQueryLists {
        top: top.unwrap_or_default(),
        rising: rising.unwrap_or_default(),
    }
}

fn convert_keywords(keywords: Vec<RankedKeyword>) -> Vec<RelatedQuery> {
    keywords
        .into_iter()
        .map(|k| RelatedQuery {
            score: if k.formatted_value.eq_ignore_ascii_case(BREAKOUT_MARKER) {
                QueryScore::Breakout
            } else {
                QueryScore::Value(k.value)
            },
            query: k.query,
        })
        .collect()
}
