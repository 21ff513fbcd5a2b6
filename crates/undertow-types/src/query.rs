//! Planned search queries produced by the query planner.

use serde::{Deserialize, Serialize};

/// Engine category of a planned query. These spellings are also what the
/// planner LLM is asked to emit, so parsing is lenient: anything unknown
/// falls back to `Search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryKind {
    #[default]
    Search,
    News,
    Scholar,
    Videos,
    Images,
    Places,
    Shopping,
}

impl QueryKind {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "News" => QueryKind::News,
            "Scholar" => QueryKind::Scholar,
            "Videos" => QueryKind::Videos,
            "Images" => QueryKind::Images,
            "Places" => QueryKind::Places,
            "Shopping" => QueryKind::Shopping,
            _ => QueryKind::Search,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Search => "Search",
            QueryKind::News => "News",
            QueryKind::Scholar => "Scholar",
            QueryKind::Videos => "Videos",
            QueryKind::Images => "Images",
            QueryKind::Places => "Places",
            QueryKind::Shopping => "Shopping",
        }
    }
}

/// Recency filter of a planned query, mapped per provider to its native
/// time-range parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePeriod {
    #[default]
    AnyTime,
    PastHour,
    PastDay,
    PastWeek,
    PastMonth,
    PastYear,
}

impl TimePeriod {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "Past hour" => TimePeriod::PastHour,
            "Past 24 hours" => TimePeriod::PastDay,
            "Past week" => TimePeriod::PastWeek,
            "Past month" => TimePeriod::PastMonth,
            "Past year" => TimePeriod::PastYear,
            _ => TimePeriod::AnyTime,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::AnyTime => "Any time",
            TimePeriod::PastHour => "Past hour",
            TimePeriod::PastDay => "Past 24 hours",
            TimePeriod::PastWeek => "Past week",
            TimePeriod::PastMonth => "Past month",
            TimePeriod::PastYear => "Past year",
        }
    }
}

impl Serialize for TimePeriod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TimePeriod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TimePeriod::parse_lenient(&s))
    }
}

/// One structured search instruction: what to ask the engine, which
/// endpoint category, in which language, over which time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedQuery {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: QueryKind,
    pub language: String,
    #[serde(default)]
    pub period: TimePeriod,
}

impl PlannedQuery {
    pub fn search(query: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            kind: QueryKind::Search,
            language: language.into(),
            period: TimePeriod::AnyTime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_round_trips_wire_strings() {
        for p in [
            TimePeriod::AnyTime,
            TimePeriod::PastHour,
            TimePeriod::PastDay,
            TimePeriod::PastWeek,
            TimePeriod::PastMonth,
            TimePeriod::PastYear,
        ] {
            let json = serde_json::to_string(&p).unwrap();
            let back: TimePeriod = serde_json::from_str(&json).unwrap();
            assert_eq!(back, p);
        }
        let p: TimePeriod = serde_json::from_str(r#""sometime""#).unwrap();
        assert_eq!(p, TimePeriod::AnyTime);
    }

    #[test]
    fn kind_parses_leniently() {
        assert_eq!(QueryKind::parse_lenient("News"), QueryKind::News);
        assert_eq!(QueryKind::parse_lenient("nonsense"), QueryKind::Search);
    }

    #[test]
    fn planned_query_serializes_kind_as_type() {
        let q = PlannedQuery::search("rust", "en");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "Search");
        assert_eq!(json["period"], "Any time");
    }
}
