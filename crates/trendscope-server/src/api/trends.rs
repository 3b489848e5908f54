use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;
use trendscope_core::Notice;
use trendscope_render::{Presentation, Report, WordCloud};

use crate::middleware::RequestId;
use crate::params::FetchParams;

use super::{fetch_and_present, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct TrendsPayload {
    #[serde(flatten)]
    pub report: Report,
    pub wordcloud_svg: Option<String>,
    pub notices: Vec<Notice>,
}

pub(super) async fn get_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<FetchParams>,
) -> Result<Json<ApiResponse<TrendsPayload>>, ApiError> {
    let query = params
        .to_query()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    match fetch_and_present(&state, &query).await {
        (Presentation::Report(report), notices) => {
            let wordcloud_svg = report.wordcloud.as_ref().map(WordCloud::to_svg);
            Ok(Json(ApiResponse {
                data: TrendsPayload {
                    report: *report,
                    wordcloud_svg,
                    notices,
                },
                meta: ResponseMeta::new(req_id.0),
            }))
        }
        (Presentation::Message { failure, text }, _) => {
            Err(ApiError::new(req_id.0, failure.code(), text))
        }
    }
}
