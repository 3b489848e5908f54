//! Tabular views of the interest series and rising queries, as HTML for the
//! report page and as aligned plain text for the CLI.

use chrono::Timelike;
use html_escape::encode_text;
use trendscope_core::{RelatedQuery, TimeSeries};

/// Date-only when every sample falls on midnight UTC, otherwise with time.
pub(crate) fn timestamp_format(series: &TimeSeries) -> &'static str {
    let hourly = series
        .rows
        .iter()
        .any(|row| row.timestamp.hour() != 0 || row.timestamp.minute() != 0);
    if hourly {
        "%Y-%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    }
}

#[must_use]
pub fn series_table_html(series: &TimeSeries) -> String {
    let fmt = timestamp_format(series);
    let mut out = String::from("<table class=\"series\">\n<thead><tr><th>date</th>");
    for term in &series.terms {
        out.push_str(&format!("<th>{}</th>", encode_text(term)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &series.rows {
        out.push_str(&format!("<tr><td>{}</td>", row.timestamp.format(fmt)));
        for value in &row.values {
            out.push_str(&format!("<td>{value}</td>"));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

#[must_use]
pub fn rising_table_html(queries: &[RelatedQuery]) -> String {
    let mut out = String::from(
        "<table class=\"rising\">\n<thead><tr><th>#</th><th>query</th><th>value</th></tr></thead>\n<tbody>\n",
    );
    for (i, q) in queries.iter().enumerate() {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            i + 1,
            encode_text(&q.query),
            q.score
        ));
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

#[must_use]
pub fn series_table_text(series: &TimeSeries) -> String {
    let fmt = timestamp_format(series);
    let dates: Vec<String> = series
        .rows
        .iter()
        .map(|row| row.timestamp.format(fmt).to_string())
        .collect();
    let date_width = dates.iter().map(String::len).max().unwrap_or(0).max(4);
    let widths: Vec<usize> = series
        .terms
        .iter()
        .map(|t| t.chars().count().max(3))
        .collect();

    let mut out = format!("{:<date_width$}", "date");
    for (term, width) in series.terms.iter().zip(widths.iter().copied()) {
        out.push_str(&format!("  {term:>width$}"));
    }
    out.push('\n');
    for (date, row) in dates.iter().zip(&series.rows) {
        out.push_str(&format!("{date:<date_width$}"));
        for (value, width) in row.values.iter().zip(widths.iter().copied()) {
            out.push_str(&format!("  {value:>width$}"));
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn rising_table_text(queries: &[RelatedQuery]) -> String {
    let query_width = queries
        .iter()
        .map(|q| q.query.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);
    let mut out = format!("{:>3}  {:<query_width$}  value\n", "#", "query");
    for (i, q) in queries.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<query_width$}  {}\n",
            i + 1,
            q.query,
            q.score
        ));
    }
    out
}
