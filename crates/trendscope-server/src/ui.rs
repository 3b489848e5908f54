//! Server-rendered HTML pages: the parameter form and the report.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use trendscope_core::{Notice, NoticeLevel, SourceProperty, Timeframe, REGIONS};
use html_escape::{encode_double_quoted_attribute, encode_text};
use trendscope_render::{rising_table_html, series_table_html, Presentation, Report};

use crate::api::{fetch_and_present, status_for_code, AppState};
use crate::params::{FetchParams, DEFAULT_KEYWORD, DEFAULT_REGION};

const TITLE: &str = "Search Trends Report";

const STYLE: &str = "body{font-family:sans-serif;max-width:880px;margin:2rem auto;padding:0 1rem}\
form{display:flex;flex-wrap:wrap;gap:.75rem;align-items:end;margin-bottom:1.5rem}\
label{display:flex;flex-direction:column;font-size:.85rem}\
table{border-collapse:collapse;margin:1rem 0}td,th{border:1px solid #ddd;padding:.25rem .6rem;text-align:left}\
.notice{padding:.5rem .75rem;border-radius:4px;margin:.4rem 0}\
.notice-success{background:#e6f4ea}.notice-warning{background:#fef7e0}\
.notice-error{background:#fce8e6}.notice-info{background:#e8f0fe}\
.series{max-height:24rem;overflow-y:auto;display:block}";

pub(crate) async fn index() -> Html<String> {
    Html(page(&form_html(&FetchParams::default()), ""))
}

pub(crate) async fn report(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Response {
    let form = form_html(&params);
    let query = match params.to_query() {
        Ok(query) => query,
        Err(e) => {
            let notice = Notice::new(NoticeLevel::Error, e.to_string());
            return (
                StatusCode::BAD_REQUEST,
                Html(page(&form, &notices_html(&[notice]))),
            )
                .into_response();
        }
    };

    let (presentation, notices) = fetch_and_present(&state, &query).await;
    let status = presentation
        .failure()
        .map_or(StatusCode::OK, |failure| status_for_code(failure.code()));
    let mut body = notices_html(&notices);
    if let Presentation::Report(report) = &presentation {
        body.push_str(&report_html(report));
    }
    (status, Html(page(&form, &body))).into_response()
}

fn page(form: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{TITLE}</h1>\n{form}{body}</body>\n</html>\n"
    )
}

fn form_html(params: &FetchParams) -> String {
    let keyword = params.keyword.as_deref().unwrap_or(DEFAULT_KEYWORD);
    let geo = params.geo.as_deref().unwrap_or(DEFAULT_REGION);
    let timeframe = params
        .timeframe
        .as_deref()
        .and_then(|t| t.parse::<Timeframe>().ok())
        .unwrap_or_default();
    let property = params
        .gprop
        .as_deref()
        .and_then(|p| p.parse::<SourceProperty>().ok())
        .unwrap_or_default();

    let mut out = String::from("<form method=\"get\" action=\"/report\">\n");
    out.push_str(&format!(
        "<label>Keyword<input name=\"keyword\" value=\"{}\" required></label>\n",
        encode_double_quoted_attribute(keyword)
    ));

    out.push_str("<label>Region<select name=\"geo\">");
    for region in REGIONS {
        option(&mut out, region, region, *region == geo);
    }
    out.push_str("</select></label>\n");

    out.push_str("<label>Timeframe<select name=\"timeframe\">");
    for t in Timeframe::ALL {
        option(&mut out, t.as_str(), t.description(), t == timeframe);
    }
    out.push_str("</select></label>\n");

    out.push_str("<label>Source<select name=\"gprop\">");
    for p in SourceProperty::ALL {
        option(&mut out, p.as_str(), p.label(), p == property);
    }
    out.push_str("</select></label>\n");

    out.push_str("<button type=\"submit\">Fetch Trends</button>\n</form>\n");
    out
}

fn option(out: &mut String, value: &str, label: &str, selected: bool) {
    let selected = if selected { " selected" } else { "" };
    out.push_str(&format!(
        "<option value=\"{}\"{selected}>{}</option>",
        encode_double_quoted_attribute(value),
        encode_text(label)
    ));
}

fn notices_html(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|notice| {
            format!(
                "<p class=\"notice notice-{}\">{}</p>\n",
                notice.level.as_str(),
                encode_text(&notice.message)
            )
        })
        .collect()
}

fn report_html(report: &Report) -> String {
    let mut out = String::from("<section>\n<h2>Interest over time</h2>\n");
    out.push_str(&report.chart_svg);
    out.push_str(&series_table_html(&report.data.series));
    out.push_str("</section>\n");

    if let Some(rising) = &report.rising {
        out.push_str(&format!(
            "<section>\n<h2>{}</h2>\n<p>{}</p>\n",
            encode_text(&rising.heading),
            encode_text(rising.explanation)
        ));
        out.push_str(&rising_table_html(&rising.queries));
        if let Some(cloud) = &report.wordcloud {
            out.push_str(&cloud.to_svg());
        }
        out.push_str("</section>\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_form_preselects_defaults() {
        let html = form_html(&FetchParams::default());
        assert!(html.contains("name=\"keyword\" value=\"abortion\""));
        assert!(html.contains("<option value=\"US\" selected>US</option>"));
        assert!(html.contains("<option value=\"today 12-m\" selected>Past 12 months</option>"));
        assert!(html.contains("<option value=\"\" selected>web</option>"));
        assert!(html.contains("Fetch Trends"));
    }

    #[test]
    fn form_keeps_submitted_values() {
        let html = form_html(&FetchParams {
            keyword: Some("roe \"v\" wade".to_string()),
            geo: Some("NV".to_string()),
            timeframe: Some("now 7-d".to_string()),
            gprop: Some("news".to_string()),
        });
        assert!(html.contains("value=\"roe &quot;v&quot; wade\""));
        assert!(html.contains("<option value=\"NV\" selected>NV</option>"));
        assert!(html.contains("<option value=\"now 7-d\" selected>"));
        assert!(html.contains("<option value=\"news\" selected>news</option>"));
    }

    #[test]
    fn notices_render_with_level_class() {
        let html = notices_html(&[Notice::new(NoticeLevel::Warning, "Rate limit reached, retrying...")]);
        assert_eq!(
            html,
            "<p class=\"notice notice-warning\">Rate limit reached, retrying...</p>\n"
        );
    }
}
