//! Parameters of a single trends fetch.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Region codes offered by the report form. Any other code is forwarded to
/// the upstream unchanged; the upstream decides whether it is valid.
pub const REGIONS: &[&str] = &[
    "US", "AR", "AZ", "CO", "FL", "MD", "MO", "MT", "NE", "NV", "OR", "SD",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("at least one search term is required")]
    NoTerms,

    #[error("search terms must not be blank")]
    BlankTerm,

    #[error("search term \"{0}\" is listed more than once")]
    DuplicateTerm(String),

    #[error("unknown timeframe \"{0}\"")]
    UnknownTimeframe(String),

    #[error("unknown source property \"{0}\"")]
    UnknownProperty(String),
}

/// Time range covered by the interest-over-time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    Now7d,
    Today1m,
    Today3m,
    #[default]
    Today12m,
    All,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::Now7d,
        Timeframe::Today1m,
        Timeframe::Today3m,
        Timeframe::Today12m,
        Timeframe::All,
    ];

    /// The range string the upstream expects in the `time` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Now7d => "now 7-d",
            Timeframe::Today1m => "today 1-m",
            Timeframe::Today3m => "today 3-m",
            Timeframe::Today12m => "today 12-m",
            Timeframe::All => "all",
        }
    }

    /// Human label used in report headings.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Timeframe::Now7d => "Past 7 days",
            Timeframe::Today1m => "Past 30 days",
            Timeframe::Today3m => "Past 90 days",
            Timeframe::Today12m => "Past 12 months",
            Timeframe::All => "2004 - present",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| QueryError::UnknownTimeframe(s.to_string()))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(value: Timeframe) -> Self {
        value.as_str().to_string()
    }
}

/// Google property the search volume is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceProperty {
    /// Regular web search; encoded as the empty string.
    #[default]
    Web,
    News,
    Images,
    Youtube,
    Froogle,
}

impl SourceProperty {
    pub const ALL: [SourceProperty; 5] = [
        SourceProperty::Web,
        SourceProperty::News,
        SourceProperty::Images,
        SourceProperty::Youtube,
        SourceProperty::Froogle,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceProperty::Web => "",
            SourceProperty::News => "news",
            SourceProperty::Images => "images",
            SourceProperty::Youtube => "youtube",
            SourceProperty::Froogle => "froogle",
        }
    }

    /// Human-readable name for selectors, since `Web` encodes as `""`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SourceProperty::Web => "web",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for SourceProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceProperty {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "web" {
            return Ok(SourceProperty::Web);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| QueryError::UnknownProperty(s.to_string()))
    }
}

impl TryFrom<String> for SourceProperty {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceProperty> for String {
    fn from(value: SourceProperty) -> Self {
        value.as_str().to_string()
    }
}

/// One fetch request. Built fresh per fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendsQuery {
    terms: Vec<String>,
    region: String,
    timeframe: Timeframe,
    property: SourceProperty,
}

impl TrendsQuery {
    /// Builds a query, trimming each term.
    ///
    /// # Errors
    ///
    /// - [`QueryError::NoTerms`] if `terms` is empty.
    /// - [`QueryError::BlankTerm`] if any term is empty after trimming.
    /// - [`QueryError::DuplicateTerm`] if two terms are equal after trimming.
    pub fn new<I, S>(
        terms: I,
        region: impl Into<String>,
        timeframe: Timeframe,
        property: SourceProperty,
    ) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .collect();
        if terms.is_empty() {
            return Err(QueryError::NoTerms);
        }
        if terms.iter().any(String::is_empty) {
            return Err(QueryError::BlankTerm);
        }
        let duplicate = {
            let mut seen = HashSet::with_capacity(terms.len());
            terms.iter().find(|t| !seen.insert(t.as_str())).cloned()
        };
        if let Some(term) = duplicate {
            return Err(QueryError::DuplicateTerm(term));
        }
        Ok(Self {
            terms,
            region: region.into().trim().to_string(),
            timeframe,
            property,
        })
    }

    /// Convenience constructor for the single-keyword report.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::BlankTerm`] if `keyword` is blank.
    pub fn single(
        keyword: &str,
        region: impl Into<String>,
        timeframe: Timeframe,
        property: SourceProperty,
    ) -> Result<Self, QueryError> {
        Self::new([keyword], region, timeframe, property)
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The first term; the report's rising-query view is built for it.
    #[must_use]
    pub fn primary_term(&self) -> &str {
        &self.terms[0]
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    #[must_use]
    pub fn property(&self) -> SourceProperty {
        self.property
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_round_trips_through_upstream_string() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.as_str().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn timeframe_rejects_unknown_range() {
        assert_eq!(
            "today 5-y".parse::<Timeframe>(),
            Err(QueryError::UnknownTimeframe("today 5-y".to_string()))
        );
    }

    #[test]
    fn timeframe_default_is_twelve_months() {
        assert_eq!(Timeframe::default().as_str(), "today 12-m");
    }

    #[test]
    fn property_empty_string_is_web_search() {
        assert_eq!("".parse::<SourceProperty>().unwrap(), SourceProperty::Web);
        assert_eq!("web".parse::<SourceProperty>().unwrap(), SourceProperty::Web);
        assert_eq!(SourceProperty::Web.as_str(), "");
        assert_eq!(SourceProperty::Web.label(), "web");
    }

    #[test]
    fn property_parses_named_values() {
        assert_eq!(
            "youtube".parse::<SourceProperty>().unwrap(),
            SourceProperty::Youtube
        );
        assert_eq!(
            "froogle".parse::<SourceProperty>().unwrap(),
            SourceProperty::Froogle
        );
        assert!("maps".parse::<SourceProperty>().is_err());
    }

    #[test]
    fn property_serializes_as_upstream_string() {
        let json = serde_json::to_string(&SourceProperty::News).unwrap();
        assert_eq!(json, "\"news\"");
        let back: SourceProperty = serde_json::from_str("\"\"").unwrap();
        assert_eq!(back, SourceProperty::Web);
    }

    #[test]
    fn query_rejects_empty_term_list() {
        let err = TrendsQuery::new(Vec::<String>::new(), "US", Timeframe::All, SourceProperty::Web)
            .unwrap_err();
        assert_eq!(err, QueryError::NoTerms);
    }

    #[test]
    fn query_rejects_blank_term() {
        let err = TrendsQuery::single("   ", "US", Timeframe::All, SourceProperty::Web).unwrap_err();
        assert_eq!(err, QueryError::BlankTerm);
    }

    #[test]
    fn query_rejects_duplicate_terms_after_trimming() {
        let err = TrendsQuery::new(
            ["abortion", "roe v wade", " abortion "],
            "US",
            Timeframe::All,
            SourceProperty::Web,
        )
        .unwrap_err();
        assert_eq!(err, QueryError::DuplicateTerm("abortion".to_string()));
        assert_eq!(
            err.to_string(),
            "search term \"abortion\" is listed more than once"
        );
    }

    #[test]
    fn query_treats_differently_cased_terms_as_distinct() {
        let q = TrendsQuery::new(["Abortion", "abortion"], "US", Timeframe::All, SourceProperty::Web)
            .unwrap();
        assert_eq!(q.terms().len(), 2);
    }

    #[test]
    fn query_trims_terms_and_keeps_region_verbatim() {
        let q = TrendsQuery::new(
            [" abortion ", "roe v wade"],
            "NV",
            Timeframe::Today3m,
            SourceProperty::News,
        )
        .unwrap();
        assert_eq!(q.terms(), ["abortion", "roe v wade"]);
        assert_eq!(q.primary_term(), "abortion");
        assert_eq!(q.region(), "NV");
        assert_eq!(q.timeframe(), Timeframe::Today3m);
        assert_eq!(q.property(), SourceProperty::News);
    }

    #[test]
    fn unknown_region_is_not_validated_locally() {
        let q = TrendsQuery::single("abortion", "ZZ", Timeframe::All, SourceProperty::Web).unwrap();
        assert_eq!(q.region(), "ZZ");
        assert!(!REGIONS.contains(&q.region()));
    }
}
