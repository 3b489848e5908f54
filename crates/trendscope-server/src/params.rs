use serde::Deserialize;
use trendscope_core::{QueryError, SourceProperty, Timeframe, TrendsQuery};

pub(crate) const DEFAULT_KEYWORD: &str = "abortion";
pub(crate) const DEFAULT_REGION: &str = "US";

/// Query-string parameters shared by the report page and the JSON endpoint.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct FetchParams {
    pub keyword: Option<String>,
    pub geo: Option<String>,
    pub timeframe: Option<String>,
    pub gprop: Option<String>,
}

impl FetchParams {
    /// Validates the parameters into a query. Missing or blank timeframe,
    /// property and region fall back to their defaults; the keyword does not.
    pub(crate) fn to_query(&self) -> Result<TrendsQuery, QueryError> {
        let timeframe = match non_blank(self.timeframe.as_deref()) {
            Some(raw) => raw.parse()?,
            None => Timeframe::default(),
        };
        let property = match non_blank(self.gprop.as_deref()) {
            Some(raw) => raw.parse()?,
            None => SourceProperty::default(),
        };
        let region = non_blank(self.geo.as_deref()).unwrap_or(DEFAULT_REGION);
        TrendsQuery::single(
            self.keyword.as_deref().unwrap_or_default(),
            region,
            timeframe,
            property,
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(keyword: &str, geo: &str, timeframe: &str, gprop: &str) -> FetchParams {
        FetchParams {
            keyword: Some(keyword.to_string()),
            geo: Some(geo.to_string()),
            timeframe: Some(timeframe.to_string()),
            gprop: Some(gprop.to_string()),
        }
    }

    #[test]
    fn full_parameters_build_query() {
        let query = params("abortion", "NV", "now 7-d", "youtube")
            .to_query()
            .unwrap();
        assert_eq!(query.primary_term(), "abortion");
        assert_eq!(query.region(), "NV");
        assert_eq!(query.timeframe(), Timeframe::Now7d);
        assert_eq!(query.property(), SourceProperty::Youtube);
    }

    #[test]
    fn blank_optional_parameters_use_defaults() {
        let query = params("abortion", " ", "", "").to_query().unwrap();
        assert_eq!(query.region(), DEFAULT_REGION);
        assert_eq!(query.timeframe(), Timeframe::Today12m);
        assert_eq!(query.property(), SourceProperty::Web);
    }

    #[test]
    fn missing_keyword_is_rejected() {
        let err = FetchParams::default().to_query().unwrap_err();
        assert_eq!(err, QueryError::BlankTerm);
    }

    #[test]
    fn unknown_timeframe_is_rejected() {
        let err = params("abortion", "US", "today 5-y", "").to_query().unwrap_err();
        assert!(matches!(err, QueryError::UnknownTimeframe(_)));
    }

    #[test]
    fn web_property_label_is_accepted() {
        let query = params("abortion", "US", "all", "web").to_query().unwrap();
        assert_eq!(query.property(), SourceProperty::Web);
    }
}
