use chrono::{Duration, TimeZone, Utc};
use trendscope_core::{
    NoticeLog, QueryScore, RelatedQueryLists, SourceProperty, TimeSeries, TimeSeriesRow,
    Timeframe,
};

use super::*;

fn query(timeframe: Timeframe) -> TrendsQuery {
    TrendsQuery::single("abortion", "US", timeframe, SourceProperty::Web).unwrap()
}

fn weekly_series(rows: usize) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    TimeSeries {
        terms: vec!["abortion".to_string()],
        rows: (0..rows)
            .map(|i| TimeSeriesRow {
                timestamp: start + Duration::weeks(i64::try_from(i).unwrap()),
                values: vec![u32::try_from(i % 100).unwrap()],
            })
            .collect(),
    }
}

fn rising(n: usize) -> Vec<RelatedQuery> {
    (0..n)
        .map(|i| RelatedQuery {
            query: format!("abortion topic{i}"),
            score: if i == 0 {
                QueryScore::Breakout
            } else {
                QueryScore::Value(1_000 - u32::try_from(i).unwrap() * 10)
            },
        })
        .collect()
}

fn data(rows: usize, rising_count: usize) -> TrendsData {
    let mut related = trendscope_core::RelatedQueries::new();
    related.insert(
        "abortion".to_string(),
        RelatedQueryLists {
            top: Vec::new(),
            rising: rising(rising_count),
        },
    );
    TrendsData {
        series: weekly_series(rows),
        related,
    }
}

fn expect_report(presentation: Presentation) -> Report {
    match presentation {
        Presentation::Report(report) => *report,
        Presentation::Message { text, .. } => panic!("expected report, got message {text:?}"),
    }
}

#[test]
fn success_renders_full_report() {
    let log = NoticeLog::new();
    let report = expect_report(present(
        &query(Timeframe::Today12m),
        FetchOutcome::Success(data(52, 8)),
        &PresentOptions::default(),
        &log,
    ));

    assert_eq!(report.data.series.len(), 52);
    assert!(report.chart_svg.contains("<polyline"));
    let section = report.rising.expect("rising section");
    assert_eq!(section.term, "abortion");
    assert_eq!(section.queries.len(), 8);
    assert_eq!(section.explanation, BREAKOUT_EXPLANATION);
    assert!(report.wordcloud.is_some());
    assert_eq!(
        log.into_notices(),
        vec![trendscope_core::Notice::new(
            NoticeLevel::Success,
            SUCCESS_NOTICE
        )]
    );
}

#[test]
fn heading_names_the_selected_timeframe() {
    let report = expect_report(present(
        &query(Timeframe::Now7d),
        FetchOutcome::Success(data(3, 2)),
        &PresentOptions::default(),
        &NoticeLog::new(),
    ));
    assert_eq!(
        report.rising.unwrap().heading,
        "Rising Queries - Past 7 days (now 7-d)"
    );
}

#[test]
fn word_cloud_is_capped_regardless_of_rising_count() {
    let report = expect_report(present(
        &query(Timeframe::Today12m),
        FetchOutcome::Success(data(5, 60)),
        &PresentOptions::default(),
        &NoticeLog::new(),
    ));
    let cloud = report.wordcloud.expect("cloud");
    assert!(cloud.len() <= 25);
    assert_eq!(report.rising.unwrap().queries.len(), 60);
}

#[test]
fn word_cloud_cap_follows_options() {
    let options = PresentOptions {
        wordcloud: WordCloudOptions::default().with_max_words(3),
        ..PresentOptions::default()
    };
    let report = expect_report(present(
        &query(Timeframe::Today12m),
        FetchOutcome::Success(data(5, 10)),
        &options,
        &NoticeLog::new(),
    ));
    assert!(report.wordcloud.unwrap().len() <= 3);
}

#[test]
fn no_rising_queries_omits_section_and_cloud() {
    let report = expect_report(present(
        &query(Timeframe::Today12m),
        FetchOutcome::Success(data(52, 0)),
        &PresentOptions::default(),
        &NoticeLog::new(),
    ));
    assert!(report.rising.is_none());
    assert!(report.wordcloud.is_none());
    assert!(report.chart_svg.contains("<polyline"));
}

#[test]
fn empty_series_is_a_single_no_data_message() {
    let log = NoticeLog::new();
    let presentation = present(
        &query(Timeframe::Today12m),
        FetchOutcome::Success(data(0, 8)),
        &PresentOptions::default(),
        &log,
    );
    assert_eq!(
        presentation,
        Presentation::Message {
            failure: FetchFailure::EmptyResult,
            text: NO_DATA_NOTICE,
        }
    );
    assert_eq!(log.count(NoticeLevel::Error), 1);
    assert_eq!(log.count(NoticeLevel::Success), 0);
}

#[test]
fn failures_pass_through_without_new_notices() {
    for failure in [FetchFailure::RateLimited, FetchFailure::UpstreamError] {
        let log = NoticeLog::new();
        let presentation = present(
            &query(Timeframe::Today12m),
            FetchOutcome::Failure(failure),
            &PresentOptions::default(),
            &log,
        );
        assert_eq!(presentation.failure(), Some(failure));
        assert!(log.notices().is_empty());
    }
}

#[test]
fn report_serializes_for_the_json_api() {
    let report = expect_report(present(
        &query(Timeframe::Today12m),
        FetchOutcome::Success(data(2, 1)),
        &PresentOptions::default(),
        &NoticeLog::new(),
    ));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["query"]["timeframe"], "today 12-m");
    assert_eq!(json["rising"]["queries"][0]["score"], "Breakout");
    assert_eq!(json["data"]["series"]["rows"].as_array().unwrap().len(), 2);
}
