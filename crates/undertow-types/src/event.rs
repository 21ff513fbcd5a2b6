//! Newline-delimited JSON event protocol for the `/websearch` stream.
//!
//! Every response is a sequence of single-line JSON events: zero or more
//! `processing`/`streaming` events followed by exactly one terminal
//! `complete` or `failure`.

use serde::{Deserialize, Serialize};

use crate::usage::ModelUsage;

/// Payload of `processing` and `failure` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub title: String,
}

/// Payload of `streaming` events: one answer token delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub content: String,
}

/// Metadata attached to the final answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerMetadata {
    pub queries: Vec<String>,
    pub sub_titles: Vec<String>,
}

/// Payload of the terminal `complete` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub content: String,
    pub metadata: AnswerMetadata,
    pub models: Vec<ModelUsage>,
}

/// One event on the wire. The serde representation matches the protocol
/// exactly: `{"status":"processing","message":{"title":…}}` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Event {
    Processing { message: Title },
    Streaming { delta: Delta },
    Complete { message: Summary },
    Failure { message: Title },
}

impl Event {
    pub fn processing(title: impl Into<String>) -> Self {
        Event::Processing {
            message: Title {
                title: title.into(),
            },
        }
    }

    pub fn streaming(content: impl Into<String>) -> Self {
        Event::Streaming {
            delta: Delta {
                content: content.into(),
            },
        }
    }

    pub fn complete(content: String, metadata: AnswerMetadata, models: Vec<ModelUsage>) -> Self {
        Event::Complete {
            message: Summary {
                content,
                metadata,
                models,
            },
        }
    }

    pub fn failure(title: impl Into<String>) -> Self {
        Event::Failure {
            message: Title {
                title: title.into(),
            },
        }
    }

    /// True for `complete` and `failure`, the two events that may end a
    /// stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Complete { .. } | Event::Failure { .. })
    }

    /// Serialize as one line of NDJSON (JSON + trailing newline).
    ///
    /// The event types are plain data, so serialization cannot fail; a
    /// defect in the protocol types would surface in tests, not at runtime.
    pub fn to_json_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"status":"failure","message":{"title":"Web search failed"}}"#.to_string()
        });
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_wire_shape() {
        let line = Event::processing("Analyzing the question...").to_json_line();
        assert_eq!(
            line,
            "{\"status\":\"processing\",\"message\":{\"title\":\"Analyzing the question...\"}}\n"
        );
    }

    #[test]
    fn streaming_wire_shape() {
        let json = serde_json::to_value(Event::streaming("tok")).unwrap();
        assert_eq!(json["status"], "streaming");
        assert_eq!(json["delta"]["content"], "tok");
    }

    #[test]
    fn complete_wire_shape() {
        let event = Event::complete(
            "answer".into(),
            AnswerMetadata {
                queries: vec!["q1".into()],
                sub_titles: vec!["s1".into()],
            },
            vec![],
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["status"], "complete");
        assert_eq!(json["message"]["content"], "answer");
        assert_eq!(json["message"]["metadata"]["queries"][0], "q1");
        assert!(event.is_terminal());
    }

    #[test]
    fn events_round_trip() {
        for event in [
            Event::processing("p"),
            Event::streaming("s"),
            Event::failure("f"),
        ] {
            let line = event.to_json_line();
            let back: Event = serde_json::from_str(line.trim()).unwrap();
            assert_eq!(back, event);
        }
    }
}
