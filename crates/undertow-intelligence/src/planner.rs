//! Query planner: rewrites history + question into planned search
//! queries, with a short-circuit for bare-URL input.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use undertow_types::{
    extract_urls, is_bare_url, ChatMessage, PlannedQuery, QueryKind, TimePeriod, TokenUsage,
};

use crate::prompts::{render, PLAN_PROMPT, PLAN_PROMPT_HISTORY};
use crate::provider::{CompletionRequest, LlmProvider, Message};

/// Search queries generated per request.
pub const N_QUERIES: usize = 3;

/// Inputs under this length get a pass-through plan seeded alongside the
/// rewrites; longer inputs are rarely usable as queries verbatim.
const PASS_THROUGH_MAX_CHARS: usize = 100;

/// Up to this many URLs embedded in the question become direct-crawl
/// plans.
const MAX_EMBEDDED_URLS: usize = 3;

/// Result of planning: the queries to run, token usage of the rewrite
/// call, and whether the input was a bare URL (search is skipped then).
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOutcome {
    pub plans: Vec<PlannedQuery>,
    pub usage: TokenUsage,
    pub url_only: bool,
}

pub struct QueryPlanner {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
}

impl QueryPlanner {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 5000,
        }
    }

    /// Plan searches for a normalized query. `preferred_kind` carries an
    /// explicit wire `search_type`; `None` lets the model pick.
    pub async fn plan(
        &self,
        query: &str,
        history: &[ChatMessage],
        language: &str,
        preferred_kind: Option<QueryKind>,
        now: DateTime<Utc>,
    ) -> PlannerOutcome {
        if history.is_empty() && is_bare_url(query) {
            debug!("bare-url input, skipping query planning");
            return PlannerOutcome {
                plans: vec![PlannedQuery::search(query.trim(), "ko")],
                usage: TokenUsage::default(),
                url_only: true,
            };
        }

        let mut plans = Vec::new();
        let num_samples = if query.chars().count() > PASS_THROUGH_MAX_CHARS {
            N_QUERIES
        } else {
            plans.push(PlannedQuery {
                query: query.to_string(),
                kind: preferred_kind.unwrap_or(QueryKind::Search),
                language: language.to_string(),
                period: TimePeriod::AnyTime,
            });
            N_QUERIES.saturating_sub(1).max(1)
        };

        let date = now.format("%Y-%m-%d %H:%M:%S").to_string();
        let num_samples_str = num_samples.to_string();
        let prompt = if history.is_empty() {
            render(
                PLAN_PROMPT,
                &[
                    ("date", date.as_str()),
                    ("num_samples", num_samples_str.as_str()),
                    ("query", query),
                ],
            )
        } else {
            let history_text = history
                .iter()
                .map(|m| format!("{}: {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n");
            render(
                PLAN_PROMPT_HISTORY,
                &[
                    ("date", date.as_str()),
                    ("num_samples", num_samples_str.as_str()),
                    ("history", history_text.as_str()),
                    ("query", query),
                ],
            )
        };

        let request = CompletionRequest::new(self.model.as_str(), vec![Message::user(prompt)])
            .with_max_tokens(self.max_tokens)
            .with_temperature(1.0)
            .with_json_object();

        let mut usage = TokenUsage::default();
        match self.provider.complete(request).await {
            Ok(response) => {
                usage += response.usage;
                plans.extend(parse_plans(&response.content));
            }
            Err(e) => {
                warn!(error = %e, "query rewrite failed, continuing with seeded plans");
            }
        }

        for url in extract_urls(query, MAX_EMBEDDED_URLS) {
            plans.push(PlannedQuery::search(url, "ko"));
        }

        PlannerOutcome {
            plans,
            usage,
            url_only: false,
        }
    }
}

/// Parse the model's JSON object of `[query, type, language, period]`
/// arrays, skipping malformed entries.
fn parse_plans(content: &str) -> Vec<PlannedQuery> {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        warn!("planner output was not valid JSON");
        return Vec::new();
    };
    let Some(object) = value.as_object() else {
        return Vec::new();
    };

    let mut plans = Vec::new();
    for entry in object.values() {
        let Some(fields) = entry.as_array() else {
            continue;
        };
        let Some(query) = fields.first().and_then(|v| v.as_str()) else {
            continue;
        };
        if query.trim().is_empty() {
            continue;
        }
        let kind = fields
            .get(1)
            .and_then(|v| v.as_str())
            .map(QueryKind::parse_lenient)
            .unwrap_or_default();
        let language = fields
            .get(2)
            .and_then(|v| v.as_str())
            .unwrap_or("en")
            .to_string();
        let period = fields
            .get(3)
            .and_then(|v| v.as_str())
            .map(TimePeriod::parse_lenient)
            .unwrap_or_default();
        plans.push(PlannedQuery {
            query: query.to_string(),
            kind,
            language,
            period,
        });
    }
    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLlmProvider;

    fn planner(mock: MockLlmProvider) -> QueryPlanner {
        QueryPlanner::new(Arc::new(mock), "plan-model")
    }

    #[tokio::test]
    async fn bare_url_short_circuits_without_llm_call() {
        let mock = MockLlmProvider::new();
        let p = planner(mock);
        let outcome = p
            .plan("https://example.com/x", &[], "en", None, Utc::now())
            .await;
        assert!(outcome.url_only);
        assert_eq!(outcome.plans.len(), 1);
        assert_eq!(outcome.plans[0].query, "https://example.com/x");
        assert_eq!(outcome.plans[0].kind, QueryKind::Search);
        assert!(outcome.usage.is_zero());
    }

    #[tokio::test]
    async fn bare_url_with_history_still_plans() {
        let mock = MockLlmProvider::new().with_completion(
            r#"{"1": ["what is example.com", "Search", "en", "Any time"]}"#,
            TokenUsage::new(10, 5),
        );
        let p = planner(mock);
        let history = vec![ChatMessage::user("earlier question")];
        let outcome = p
            .plan("https://example.com/x", &history, "en", None, Utc::now())
            .await;
        assert!(!outcome.url_only);
        assert!(outcome.plans.len() >= 2);
    }

    #[tokio::test]
    async fn short_query_seeds_pass_through_plan() {
        let mock = MockLlmProvider::new().with_completion(
            r#"{"1": ["rust async runtime comparison", "Search", "en", "Past year"],
                "2": ["tokio vs async-std benchmarks", "Search", "en", "Any time"]}"#,
            TokenUsage::new(40, 20),
        );
        let p = planner(mock);
        let outcome = p
            .plan("rust async runtimes", &[], "en", None, Utc::now())
            .await;
        assert_eq!(outcome.plans[0].query, "rust async runtimes");
        assert_eq!(outcome.plans.len(), 3);
        assert_eq!(outcome.usage, TokenUsage::new(40, 20));
        assert_eq!(outcome.plans[1].period, TimePeriod::PastYear);
    }

    #[tokio::test]
    async fn long_query_skips_pass_through() {
        let mock = MockLlmProvider::new().with_completion(
            r#"{"1": ["summary query", "Search", "en", "Any time"]}"#,
            TokenUsage::new(5, 5),
        );
        let p = planner(mock);
        let long_query = "word ".repeat(40);
        let outcome = p.plan(long_query.trim(), &[], "en", None, Utc::now()).await;
        assert_eq!(outcome.plans.len(), 1);
        assert_eq!(outcome.plans[0].query, "summary query");
    }

    #[tokio::test]
    async fn embedded_urls_append_search_plans() {
        let mock = MockLlmProvider::new().with_completion(
            r#"{"1": ["paper summary", "Scholar", "en", "Any time"]}"#,
            TokenUsage::new(5, 5),
        );
        let p = planner(mock);
        let outcome = p
            .plan(
                "summarize https://arxiv.org/abs/2409.01140 please",
                &[],
                "en",
                None,
                Utc::now(),
            )
            .await;
        let last = outcome.plans.last().unwrap();
        assert_eq!(last.query, "https://arxiv.org/abs/2409.01140");
        assert_eq!(last.kind, QueryKind::Search);
    }

    #[tokio::test]
    async fn llm_failure_keeps_seeded_plans() {
        let mock = MockLlmProvider::new().always_fail();
        let p = planner(mock);
        let outcome = p.plan("short question", &[], "en", None, Utc::now()).await;
        assert_eq!(outcome.plans.len(), 1);
        assert_eq!(outcome.plans[0].query, "short question");
        assert!(outcome.usage.is_zero());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let plans = parse_plans(
            r#"{"1": ["good query", "News", "ko", "Past week"],
                "2": "not an array",
                "3": ["", "Search", "en", "Any time"],
                "4": ["minimal"]}"#,
        );
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].kind, QueryKind::News);
        assert_eq!(plans[1].query, "minimal");
        assert_eq!(plans[1].kind, QueryKind::Search);
        assert_eq!(plans[1].period, TimePeriod::AnyTime);
    }

    #[test]
    fn non_json_output_yields_no_plans() {
        assert!(parse_plans("sorry, here are some queries:").is_empty());
    }
}
