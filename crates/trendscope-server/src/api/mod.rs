mod trends;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use trendscope_client::TrendsFetcher;
use trendscope_core::{
    AppConfig, Notice, NoticeLog, SourceProperty, Timeframe, TrendsQuery, REGIONS,
};
use trendscope_render::{present, PresentOptions, Presentation};

use crate::middleware::{
    enforce_rate_limit, request_id, RateLimitState, RequestId, X_REQUEST_ID,
};
use crate::ui;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fetcher: Arc<TrendsFetcher>,
    pub present: Arc<PresentOptions>,
}

impl AppState {
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        Self {
            fetcher: Arc::new(TrendsFetcher::from_app_config(&config)),
            present: Arc::new(PresentOptions::from_app_config(&config)),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct OptionItem {
    value: &'static str,
    label: &'static str,
}

#[derive(Debug, Serialize)]
struct OptionsData {
    regions: &'static [&'static str],
    timeframes: Vec<OptionItem>,
    properties: Vec<OptionItem>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

/// HTTP status for an error code, shared by the JSON API and the HTML pages.
pub(crate) fn status_for_code(code: &str) -> StatusCode {
    match code {
        "not_found" | "no_data" => StatusCode::NOT_FOUND,
        "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
        "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
        "upstream_rate_limited" => StatusCode::SERVICE_UNAVAILABLE,
        "upstream_error" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = status_for_code(&self.error.code);
        (status, Json(self)).into_response()
    }
}

/// Runs one fetch for `query` and renders it, returning the presentation
/// together with every notice raised along the way.
pub(crate) async fn fetch_and_present(
    state: &AppState,
    query: &TrendsQuery,
) -> (Presentation, Vec<Notice>) {
    let log = NoticeLog::new();
    let outcome = state.fetcher.fetch(query, &log).await;
    let presentation = present(query, outcome, &state.present, &log);
    (presentation, log.into_notices())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            X_REQUEST_ID,
        ])
}

/// Routes that trigger an upstream fetch. Guarded by the inbound limiter and
/// never cached.
fn fetch_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/report", get(ui::report))
        .route("/api/v1/trends", get(trends::get_trends))
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState) -> Router {
    let rate_limit = RateLimitState::per_minute(state.config.inbound_rate_limit_per_min);
    let public_routes = Router::new()
        .route("/", get(ui::index))
        .route("/api/v1/health", get(health))
        .route("/api/v1/options", get(options));

    Router::new()
        .merge(public_routes)
        .merge(fetch_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn options(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    let timeframes = Timeframe::ALL
        .into_iter()
        .map(|t| OptionItem {
            value: t.as_str(),
            label: t.description(),
        })
        .collect();
    let properties = SourceProperty::ALL
        .into_iter()
        .map(|p| OptionItem {
            value: p.as_str(),
            label: p.label(),
        })
        .collect();
    Json(ApiResponse {
        data: OptionsData {
            regions: REGIONS,
            timeframes,
            properties,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
