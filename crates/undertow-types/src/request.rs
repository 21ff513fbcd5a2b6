//! Request payload for `POST /websearch`.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::query::QueryKind;

/// A single message of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Search category requested on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Auto,
    General,
    Scholar,
    News,
    Youtube,
}

impl SearchType {
    /// Engine category this wire type maps to. `Auto` leaves the choice to
    /// the query planner.
    pub fn query_kind(self) -> Option<QueryKind> {
        match self {
            SearchType::Auto => None,
            SearchType::General => Some(QueryKind::Search),
            SearchType::Scholar => Some(QueryKind::Scholar),
            SearchType::News => Some(QueryKind::News),
            SearchType::Youtube => Some(QueryKind::Videos),
        }
    }
}

/// Per-request cap on merged search results. `Auto` keeps everything the
/// providers return; `Limit(k)` slices `⌊k / n⌋` hits from each of the `n`
/// parallel queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopK {
    #[default]
    Auto,
    Limit(usize),
}

impl TopK {
    pub fn limit(self) -> Option<usize> {
        match self {
            TopK::Auto => None,
            TopK::Limit(k) => Some(k),
        }
    }
}

impl Serialize for TopK {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TopK::Auto => serializer.serialize_str("auto"),
            TopK::Limit(k) => serializer.serialize_u64(*k as u64),
        }
    }
}

impl<'de> Deserialize<'de> for TopK {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TopKVisitor;

        impl<'de> Visitor<'de> for TopKVisitor {
            type Value = TopK;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(r#"a positive integer, "auto", or null"#)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TopK, E> {
                Ok(TopK::Limit(v as usize))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TopK, E> {
                if v <= 0 {
                    Ok(TopK::Auto)
                } else {
                    Ok(TopK::Limit(v as usize))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TopK, E> {
                match v {
                    "auto" => Ok(TopK::Auto),
                    other => other
                        .parse::<usize>()
                        .map(TopK::Limit)
                        .map_err(|_| E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }

            fn visit_unit<E: de::Error>(self) -> Result<TopK, E> {
                Ok(TopK::Auto)
            }

            fn visit_none<E: de::Error>(self) -> Result<TopK, E> {
                Ok(TopK::Auto)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<TopK, D::Error> {
                d.deserialize_any(TopKVisitor)
            }
        }

        deserializer.deserialize_option(TopKVisitor)
    }
}

fn default_na() -> String {
    "N/A".to_string()
}

fn default_nuance() -> String {
    "Natural".to_string()
}

fn default_true() -> bool {
    true
}

/// Body of `POST /websearch`. Immutable for the lifetime of a request once
/// normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub search_type: SearchType,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_na")]
    pub persona_prompt: String,
    #[serde(default = "default_na")]
    pub custom_prompt: String,
    #[serde(default = "default_nuance")]
    pub target_nuance: String,
    #[serde(default = "default_true")]
    pub return_process: bool,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub use_youtube_transcript: bool,
    #[serde(default)]
    pub top_k: TopK,
}

impl QueryRequest {
    /// Normalize in place: collapse embedded newlines/tabs in the query,
    /// trim it, keep only the last four history messages, and force the
    /// transcript flag on for explicit YouTube searches.
    pub fn normalize(&mut self) {
        self.query = self
            .query
            .replace(['\n', '\t'], " ")
            .trim()
            .to_string();
        if self.messages.len() > 4 {
            self.messages = self.messages.split_off(self.messages.len() - 4);
        }
        if self.search_type == SearchType::Youtube {
            self.use_youtube_transcript = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_accepts_int_auto_and_null() {
        let v: TopK = serde_json::from_str("7").unwrap();
        assert_eq!(v, TopK::Limit(7));
        let v: TopK = serde_json::from_str(r#""auto""#).unwrap();
        assert_eq!(v, TopK::Auto);
        let v: TopK = serde_json::from_str("null").unwrap();
        assert_eq!(v, TopK::Auto);
    }

    #[test]
    fn request_defaults() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"query":"hi","language":"en"}"#).unwrap();
        assert_eq!(req.persona_prompt, "N/A");
        assert_eq!(req.custom_prompt, "N/A");
        assert_eq!(req.target_nuance, "Natural");
        assert!(req.return_process);
        assert!(!req.stream);
        assert_eq!(req.top_k, TopK::Auto);
        assert_eq!(req.search_type, SearchType::Auto);
    }

    #[test]
    fn normalize_trims_query_and_history() {
        let mut req: QueryRequest =
            serde_json::from_str(r#"{"query":"  a\nb\tc  ","language":"en"}"#).unwrap();
        req.messages = (0..6).map(|i| ChatMessage::user(format!("m{i}"))).collect();
        req.normalize();
        assert_eq!(req.query, "a b c");
        assert_eq!(req.messages.len(), 4);
        assert_eq!(req.messages[0].content, "m2");
    }

    #[test]
    fn youtube_search_forces_transcript_flag() {
        let mut req: QueryRequest = serde_json::from_str(
            r#"{"query":"q","language":"en","search_type":"youtube"}"#,
        )
        .unwrap();
        assert!(!req.use_youtube_transcript);
        req.normalize();
        assert!(req.use_youtube_transcript);
    }
}
