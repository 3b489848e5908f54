//! Google Trends client for trendscope.
//!
//! [`TrendsFetcher::fetch`] is the entry point: it opens a fresh upstream
//! session, requests interest-over-time and related queries, retries rate
//! limits with a fixed cool-down, and always returns a
//! [`trendscope_core::FetchOutcome`].

pub mod client;
mod convert;
pub mod error;
pub mod fetcher;
pub mod retry;
pub mod types;

pub use client::{ClientSettings, TrendsClient};
pub use error::TrendsError;
pub use fetcher::{TrendsFetcher, RATE_LIMIT_EXHAUSTED_NOTICE, RESPONSE_ERROR_NOTICE};
pub use retry::{RetryPolicy, RETRY_NOTICE};
pub use trendscope_core::{NoticeLog, Notifier, TracingNotifier};
