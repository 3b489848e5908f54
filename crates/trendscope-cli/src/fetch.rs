//! `trendscope fetch`: one fetch, printed as text or JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use trendscope_client::TrendsFetcher;
use trendscope_core::{AppConfig, NoticeLevel, SourceProperty, Timeframe, TrendsQuery};
use trendscope_render::{
    present, rising_table_text, series_table_text, PresentOptions, Presentation, Report,
};

#[derive(Debug, Args)]
pub(crate) struct FetchArgs {
    /// Search term
    #[arg(long, default_value = "abortion")]
    pub keyword: String,
    /// Region code (e.g. US, NV)
    #[arg(long, default_value = "US")]
    pub geo: String,
    /// Time range: "now 7-d", "today 1-m", "today 3-m", "today 12-m" or "all"
    #[arg(long, default_value = "today 12-m")]
    pub timeframe: Timeframe,
    /// Source property: web, news, images, youtube or froogle
    #[arg(long, default_value = "web")]
    pub property: SourceProperty,
    /// Write the interest-over-time chart as SVG to this path
    #[arg(long)]
    pub chart_out: Option<PathBuf>,
    /// Write the rising-queries word cloud as SVG to this path
    #[arg(long)]
    pub wordcloud_out: Option<PathBuf>,
    /// Print the report as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

/// Prints notices to stderr as they arrive.
fn stderr_notice(level: NoticeLevel, message: &str) {
    eprintln!("[{}] {message}", level.as_str());
}

/// Runs the fetch and prints the report.
///
/// Exit code 0 on a report, 1 when the fetch produced only a message,
/// 130 when interrupted while waiting on the upstream.
///
/// # Errors
///
/// Returns an error if the query is invalid or an output file cannot be
/// written.
pub(crate) async fn run_fetch(config: &AppConfig, args: FetchArgs) -> anyhow::Result<ExitCode> {
    let query = TrendsQuery::single(&args.keyword, args.geo.as_str(), args.timeframe, args.property)
        .context("invalid fetch parameters")?;
    let fetcher = TrendsFetcher::from_app_config(config);
    let notifier = stderr_notice;

    let outcome = tokio::select! {
        outcome = fetcher.fetch(&query, &notifier) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("fetch interrupted");
            return Ok(ExitCode::from(130));
        }
    };

    let report = match present(
        &query,
        outcome,
        &PresentOptions::from_app_config(config),
        &notifier,
    ) {
        Presentation::Report(report) => report,
        Presentation::Message { failure, .. } => {
            tracing::debug!(code = failure.code(), "fetch produced no report");
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(path) = &args.chart_out {
        std::fs::write(path, &report.chart_svg)
            .with_context(|| format!("failed to write chart to {}", path.display()))?;
        eprintln!("chart written to {}", path.display());
    }
    if let Some(path) = &args.wordcloud_out {
        match &report.wordcloud {
            Some(cloud) => {
                std::fs::write(path, cloud.to_svg())
                    .with_context(|| format!("failed to write word cloud to {}", path.display()))?;
                eprintln!("word cloud written to {}", path.display());
            }
            None => eprintln!("no rising queries; word cloud not written"),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report_text(&report));
    }
    Ok(ExitCode::SUCCESS)
}

fn report_text(report: &Report) -> String {
    let query = &report.query;
    let mut out = format!(
        "Interest over time: {} ({}, {}, {})\n\n",
        query.terms().join(", "),
        query.region(),
        query.timeframe(),
        query.property().label()
    );
    out.push_str(&series_table_text(&report.data.series));
    if let Some(rising) = &report.rising {
        out.push_str(&format!("\n{}\n{}\n\n", rising.heading, rising.explanation));
        out.push_str(&rising_table_text(&rising.queries));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use trendscope_core::{
        FetchOutcome, NoticeLog, QueryScore, RelatedQuery, RelatedQueryLists, TimeSeries,
        TimeSeriesRow, TrendsData,
    };

    use super::*;

    fn report(rising: Vec<RelatedQuery>) -> Report {
        let query =
            TrendsQuery::single("abortion", "NV", Timeframe::Now7d, SourceProperty::News).unwrap();
        let mut data = TrendsData {
            series: TimeSeries {
                terms: vec!["abortion".to_string()],
                rows: vec![TimeSeriesRow {
                    timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                    values: vec![77],
                }],
            },
            ..TrendsData::default()
        };
        data.related.insert(
            "abortion".to_string(),
            RelatedQueryLists {
                top: Vec::new(),
                rising,
            },
        );
        match present(
            &query,
            FetchOutcome::Success(data),
            &PresentOptions::default(),
            &NoticeLog::new(),
        ) {
            Presentation::Report(report) => *report,
            Presentation::Message { text, .. } => panic!("unexpected message {text}"),
        }
    }

    #[test]
    fn text_report_includes_series_and_rising_tables() {
        let text = report_text(&report(vec![RelatedQuery {
            query: "abortion pill".to_string(),
            score: QueryScore::Breakout,
        }]));
        assert!(text.starts_with("Interest over time: abortion (NV, now 7-d, news)\n"));
        assert!(text.contains("2024-03-01"));
        assert!(text.contains("Rising Queries - Past 7 days (now 7-d)"));
        assert!(text.contains("abortion pill  Breakout"));
    }

    #[test]
    fn text_report_without_rising_queries_skips_section() {
        let text = report_text(&report(Vec::new()));
        assert!(!text.contains("Rising Queries"));
    }
}
