//! Shared domain model and configuration for trendscope.
//!
//! Holds the query parameters sent to the trends upstream, the result shapes
//! handed to the presenter, and the env-driven application config.

pub mod app_config;
mod config;
pub mod notice;
pub mod query;
pub mod trends;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use notice::{Notice, NoticeLevel, NoticeLog, Notifier, TracingNotifier};
pub use query::{QueryError, SourceProperty, Timeframe, TrendsQuery, REGIONS};
pub use trends::{
    FetchFailure, FetchOutcome, QueryScore, RelatedQueries, RelatedQuery, RelatedQueryLists,
    TimeSeries, TimeSeriesRow, TrendsData,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
