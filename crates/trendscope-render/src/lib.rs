//! Renders a fetch outcome into the trendscope report.
//!
//! [`present`] turns a [`trendscope_core::FetchOutcome`] into either a full
//! [`Report`] (line chart, series table, rising queries and word cloud) or a
//! single user-facing message.

pub mod chart;
pub mod presenter;
pub mod table;
pub mod wordcloud;

pub use chart::{line_chart_svg, ChartOptions};
pub use presenter::{
    present, PresentOptions, Presentation, Report, RisingSection, BREAKOUT_EXPLANATION,
    NO_DATA_NOTICE, SUCCESS_NOTICE,
};
pub use table::{rising_table_html, rising_table_text, series_table_html, series_table_text};
pub use wordcloud::{word_frequencies, PlacedWord, WordCloud, WordCloudOptions, WordCount};
