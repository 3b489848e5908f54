//! HTTP session against the Google Trends web API.
//!
//! A [`TrendsClient`] owns its own cookie store, so one instance is one
//! upstream session. The fetcher builds a fresh client per fetch and drops it
//! afterwards.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use trendscope_core::{AppConfig, RelatedQueries, TimeSeries, TrendsData, TrendsQuery};

use crate::convert::{ranked_lists, timeline_to_series};
use crate::error::TrendsError;
use crate::types::{
    ComparisonItem, ExploreRequest, ExploreResponse, MultilineResponse, RelatedSearchesResponse,
    Widget,
};

const DEFAULT_BASE_URL: &str = "https://trends.google.com/";
const EXPLORE_PATH: &str = "trends/api/explore";
const MULTILINE_PATH: &str = "trends/api/widgetdata/multiline";
const RELATED_SEARCHES_PATH: &str = "trends/api/widgetdata/relatedsearches";

const TIMESERIES_WIDGET: &str = "TIMESERIES";
const RELATED_QUERIES_WIDGET: &str = "RELATED_QUERIES";

/// Connection parameters for a trends session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub host_language: String,
    pub tz_offset_minutes: i32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            host_language: "en-US".to_string(),
            tz_offset_minutes: 360,
            timeout_secs: 30,
            user_agent: "trendscope/0.1 (search-trend-report)".to_string(),
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.upstream_base_url.clone(),
            host_language: config.host_language.clone(),
            tz_offset_minutes: config.tz_offset_minutes,
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Same settings pointed at another base URL (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

/// One upstream session.
pub struct TrendsClient {
    client: Client,
    base_url: Url,
    host_language: String,
    tz: String,
}

impl TrendsClient {
    /// Opens a new session with an empty cookie store.
    ///
    /// # Errors
    ///
    /// Returns [`TrendsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TrendsError::InvalidUrl`] if the base URL
    /// does not parse.
    pub fn new(settings: &ClientSettings) -> Result<Self, TrendsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        // Exactly one trailing slash so relative API paths join under the root.
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| TrendsError::InvalidUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            host_language: settings.host_language.clone(),
            tz: settings.tz_offset_minutes.to_string(),
        })
    }

    /// Runs one complete attempt: cookies, widget tokens, then both datasets.
    ///
    /// # Errors
    ///
    /// Any [`TrendsError`]; [`TrendsError::RateLimited`] if any of the calls
    /// answered 429.
    pub async fn fetch_once(&self, query: &TrendsQuery) -> Result<TrendsData, TrendsError> {
        self.prime_cookies().await?;
        let widgets = self.explore(query).await?;
        let series = self.interest_over_time(query, &widgets).await?;
        let related = self.related_queries(query, &widgets).await?;
        Ok(TrendsData { series, related })
    }

    /// Loads the site root so the session picks up the cookies the API
    /// endpoints expect.
    ///
    /// Only a rate-limit answer or a transport failure is an error here; any
    /// other status is logged and ignored.
    ///
    /// # Errors
    ///
    /// [`TrendsError::RateLimited`] on 429, [`TrendsError::Http`] on network
    /// failure.
    pub async fn prime_cookies(&self) -> Result<(), TrendsError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("geo", self.cookie_geo());

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TrendsError::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "cookie priming returned non-success status");
        }
        Ok(())
    }

    /// Calls `explore` and returns the widgets carrying the tokens for the
    /// data endpoints.
    ///
    /// # Errors
    ///
    /// - [`TrendsError::RateLimited`] on 429.
    /// - [`TrendsError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`TrendsError::Deserialize`] if the body is not the expected shape.
    pub async fn explore(&self, query: &TrendsQuery) -> Result<Vec<Widget>, TrendsError> {
        let payload = ExploreRequest {
            comparison_item: query
                .terms()
                .iter()
                .map(|term| ComparisonItem {
                    keyword: term,
                    time: query.timeframe().as_str(),
                    geo: query.region(),
                })
                .collect(),
            category: 0,
            property: query.property().as_str(),
        };
        let req = serde_json::to_string(&payload).map_err(|e| TrendsError::Deserialize {
            context: "explore request payload".to_string(),
            source: e,
        })?;

        let url = self.build_url(
            EXPLORE_PATH,
            &[
                ("hl", &self.host_language),
                ("tz", &self.tz),
                ("req", &req),
            ],
        )?;
        let explore: ExploreResponse = self.request_json(&url, "explore").await?;
        tracing::debug!(widgets = explore.widgets.len(), "explore returned widgets");
        Ok(explore.widgets)
    }

    /// Fetches the interest-over-time series from the `TIMESERIES` widget.
    ///
    /// # Errors
    ///
    /// - [`TrendsError::MissingWidget`] if `widgets` has no `TIMESERIES` entry.
    /// - [`TrendsError::Malformed`] if the timeline breaks the series invariants.
    /// - Request errors as for [`TrendsClient::explore`].
    pub async fn interest_over_time(
        &self,
        query: &TrendsQuery,
        widgets: &[Widget],
    ) -> Result<TimeSeries, TrendsError> {
        let widget = widgets
            .iter()
            .find(|w| w.id == TIMESERIES_WIDGET)
            .ok_or(TrendsError::MissingWidget(TIMESERIES_WIDGET))?;

        let url = self.widget_url(MULTILINE_PATH, widget)?;
        let response: MultilineResponse = self.request_json(&url, "widgetdata/multiline").await?;
        timeline_to_series(query.terms(), response.default.timeline_data)
    }

    /// Fetches top and rising related queries for every query term.
    ///
    /// Terms without a related-queries widget map to empty lists; widgets for
    /// keywords outside the query are skipped.
    ///
    /// # Errors
    ///
    /// Request errors as for [`TrendsClient::explore`].
    pub async fn related_queries(
        &self,
        query: &TrendsQuery,
        widgets: &[Widget],
    ) -> Result<RelatedQueries, TrendsError> {
        let mut related: RelatedQueries = query
            .terms()
            .iter()
            .map(|term| (term.clone(), Default::default()))
            .collect();

        for widget in widgets.iter().filter(|w| w.id.contains(RELATED_QUERIES_WIDGET)) {
            let term = match widget.restriction_keyword() {
                Some(keyword) => keyword.to_string(),
                // Single-term payloads can come back without a restriction.
                None if query.terms().len() == 1 => query.primary_term().to_string(),
                None => {
                    tracing::warn!(widget = %widget.id, "related-queries widget without keyword; skipping");
                    continue;
                }
            };
            let Some(slot) = related.get_mut(&term) else {
                tracing::warn!(keyword = %term, "related-queries widget for unknown term; skipping");
                continue;
            };

            let url = self.widget_url(RELATED_SEARCHES_PATH, widget)?;
            let response: RelatedSearchesResponse =
                self.request_json(&url, "widgetdata/relatedsearches").await?;
            *slot = ranked_lists(response.default);
        }

        Ok(related)
    }

    fn widget_url(&self, path: &str, widget: &Widget) -> Result<Url, TrendsError> {
        let req = serde_json::to_string(&widget.request).map_err(|e| TrendsError::Deserialize {
            context: format!("{} widget request", widget.id),
            source: e,
        })?;
        self.build_url(
            path,
            &[("req", &req), ("token", &widget.token), ("tz", &self.tz)],
        )
    }

    /// Builds an API URL under the base URL with percent-encoded parameters.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, TrendsError> {
        let mut url = self.base_url.join(path).map_err(|e| TrendsError::InvalidUrl {
            url: format!("{}{path}", self.base_url),
            reason: e.to_string(),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, maps the status, strips the anti-XSSI prefix and
    /// deserializes the body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, TrendsError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TrendsError::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(TrendsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(strip_xssi_prefix(&body)).map_err(|e| TrendsError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Country used for cookie priming: the region part of the host language.
    fn cookie_geo(&self) -> &str {
        self.host_language
            .rsplit_once('-')
            .map_or("US", |(_, region)| region)
    }
}

/// Drops the `)]}'` / `)]}',` guard the trends API puts in front of JSON.
pub(crate) fn strip_xssi_prefix(body: &str) -> &str {
    body.find(['{', '[']).map_or(body, |idx| &body[idx..])
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
