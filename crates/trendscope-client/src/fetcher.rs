//! The one user-triggered operation: fetch interest-over-time and related
//! queries for a query, retrying rate limits, and report the outcome.

use trendscope_core::{
    AppConfig, FetchFailure, FetchOutcome, NoticeLevel, Notifier, TrendsData, TrendsQuery,
};

use crate::client::{ClientSettings, TrendsClient};
use crate::error::TrendsError;
use crate::retry::{retry_on_rate_limit, RetryPolicy};

/// Shown when every attempt was rate limited.
pub const RATE_LIMIT_EXHAUSTED_NOTICE: &str = FetchFailure::RateLimited.message();

/// Shown when the upstream failed in a way retrying would not fix.
pub const RESPONSE_ERROR_NOTICE: &str = FetchFailure::UpstreamError.message();

/// Fetches trends data and converts every terminal condition into a
/// [`FetchOutcome`].
#[derive(Debug, Clone)]
pub struct TrendsFetcher {
    settings: ClientSettings,
    policy: RetryPolicy,
}

impl TrendsFetcher {
    #[must_use]
    pub fn new(settings: ClientSettings, policy: RetryPolicy) -> Self {
        Self { settings, policy }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            ClientSettings::from_app_config(config),
            RetryPolicy::from_app_config(config),
        )
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs one fetch.
    ///
    /// Opens a fresh upstream session, then retries the whole request on
    /// rate-limit answers per the configured [`RetryPolicy`]. Never fails:
    ///
    /// - rate limited on every attempt → `Failure(RateLimited)`
    /// - any other upstream error → `Failure(UpstreamError)`, logged, no retry
    /// - otherwise → `Success`, possibly with an empty series
    pub async fn fetch(&self, query: &TrendsQuery, notifier: &dyn Notifier) -> FetchOutcome {
        tracing::info!(
            terms = ?query.terms(),
            region = query.region(),
            timeframe = %query.timeframe(),
            property = query.property().label(),
            "fetching trends"
        );

        match self.try_fetch(query, notifier).await {
            Ok(data) => {
                tracing::info!(
                    rows = data.series.len(),
                    related_terms = data.related.len(),
                    "trends fetch succeeded"
                );
                FetchOutcome::Success(data)
            }
            Err(err) if err.is_rate_limited() => {
                tracing::error!(
                    attempts = self.policy.max_attempts.max(1),
                    error = %err,
                    "trends fetch gave up after repeated rate limiting"
                );
                notifier.notify(NoticeLevel::Error, RATE_LIMIT_EXHAUSTED_NOTICE);
                FetchOutcome::Failure(FetchFailure::RateLimited)
            }
            Err(err) => {
                tracing::error!(error = %err, "trends upstream response error");
                notifier.notify(NoticeLevel::Error, RESPONSE_ERROR_NOTICE);
                FetchOutcome::Failure(FetchFailure::UpstreamError)
            }
        }
    }

    async fn try_fetch(
        &self,
        query: &TrendsQuery,
        notifier: &dyn Notifier,
    ) -> Result<TrendsData, TrendsError> {
        let session = TrendsClient::new(&self.settings)?;
        retry_on_rate_limit(self.policy, notifier, || session.fetch_once(query)).await
    }
}
