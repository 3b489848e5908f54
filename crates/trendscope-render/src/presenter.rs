//! Turns a fetch outcome into what the user sees.

use serde::Serialize;
use trendscope_core::{
    AppConfig, FetchFailure, FetchOutcome, NoticeLevel, Notifier, RelatedQuery, TrendsData,
    TrendsQuery,
};

use crate::chart::{line_chart_svg, ChartOptions};
use crate::wordcloud::{text_from_queries, WordCloud, WordCloudOptions};

pub const SUCCESS_NOTICE: &str = "Data fetched successfully!";

pub const NO_DATA_NOTICE: &str = FetchFailure::EmptyResult.message();

pub const BREAKOUT_EXPLANATION: &str = "Rising queries are searches with the biggest increase \
     in search frequency since the previous period. \"Breakout\" marks a tremendous increase, \
     usually because the query is new and had few (if any) prior searches.";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PresentOptions {
    pub chart: ChartOptions,
    pub wordcloud: WordCloudOptions,
}

impl PresentOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            chart: ChartOptions::default(),
            wordcloud: WordCloudOptions::default().with_max_words(config.wordcloud_max_words),
        }
    }
}

/// Rising queries for the query's first term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RisingSection {
    pub term: String,
    pub heading: String,
    pub explanation: &'static str,
    pub queries: Vec<RelatedQuery>,
}

/// Everything shown for a successful, non-empty fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub query: TrendsQuery,
    pub data: TrendsData,
    pub chart_svg: String,
    /// `None` when the first term has no rising queries.
    pub rising: Option<RisingSection>,
    /// `None` when there are no rising queries or no word survives filtering.
    pub wordcloud: Option<WordCloud>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Report(Box<Report>),
    /// A single status line instead of any report content.
    Message {
        failure: FetchFailure,
        text: &'static str,
    },
}

impl Presentation {
    #[must_use]
    pub fn failure(&self) -> Option<FetchFailure> {
        match self {
            Presentation::Report(_) => None,
            Presentation::Message { failure, .. } => Some(*failure),
        }
    }
}

/// Renders `outcome` for `query`.
///
/// A successful fetch with rows notifies [`SUCCESS_NOTICE`] and yields a
/// report. A successful fetch without rows notifies [`NO_DATA_NOTICE`] and is
/// classified as [`FetchFailure::EmptyResult`]. Failures were already
/// notified by the fetcher, so they only carry their message here.
pub fn present(
    query: &TrendsQuery,
    outcome: FetchOutcome,
    options: &PresentOptions,
    notifier: &dyn Notifier,
) -> Presentation {
    let data = match outcome {
        FetchOutcome::Failure(failure) => {
            return Presentation::Message {
                failure,
                text: failure.message(),
            }
        }
        FetchOutcome::Success(data) if data.series.is_empty() => {
            tracing::info!(terms = ?query.terms(), region = query.region(), "no data for query");
            notifier.notify(NoticeLevel::Error, NO_DATA_NOTICE);
            return Presentation::Message {
                failure: FetchFailure::EmptyResult,
                text: NO_DATA_NOTICE,
            };
        }
        FetchOutcome::Success(data) => data,
    };

    notifier.notify(NoticeLevel::Success, SUCCESS_NOTICE);

    let chart_svg = line_chart_svg(&data.series, &options.chart);
    let term = query.primary_term();
    let rising = data.rising_for(term);
    let (rising, wordcloud) = if rising.is_empty() {
        (None, None)
    } else {
        let cloud = WordCloud::generate(&text_from_queries(rising), &options.wordcloud);
        let section = RisingSection {
            term: term.to_string(),
            heading: rising_heading(query),
            explanation: BREAKOUT_EXPLANATION,
            queries: rising.to_vec(),
        };
        (Some(section), cloud)
    };

    Presentation::Report(Box::new(Report {
        query: query.clone(),
        data,
        chart_svg,
        rising,
        wordcloud,
    }))
}

fn rising_heading(query: &TrendsQuery) -> String {
    let timeframe = query.timeframe();
    format!(
        "Rising Queries - {} ({})",
        timeframe.description(),
        timeframe.as_str()
    )
}

#[cfg(test)]
#[path = "presenter_test.rs"]
mod tests;
