//! Request orchestrator.
//!
//! One `/websearch` request walks PLAN → SEARCH → (EXTRACT ∥ OUTLINE) →
//! ANSWER → SUMMARY, yielding protocol events along the way. Per-URL and
//! per-provider failures degrade locally; only an empty plan, zero search
//! results, a model timeout, or an unexpected early exit terminate the
//! stream with a `failure` event. Every stream ends with exactly one
//! terminal event.

use async_stream::stream;
use chrono::Utc;
use futures::{Stream, StreamExt};
use tracing::warn;
use undertow_intelligence::prompts::{render, ANSWER_PROMPT};
use undertow_intelligence::{
    model_id, CompletionRequest, IntelligenceError, Message, OutlineGenerator, QueryPlanner,
    StreamChunk,
};
use undertow_search::{SearchClient, SearchOptions, DEFAULT_SIMHASH_THRESHOLD};
use undertow_types::{
    language_info, AnswerMetadata, Event, ModelId, ModelUsage, QueryRequest, SearchHit, TokenUsage,
};

use crate::crawl::Crawler;
use crate::state::AppState;

const MSG_ANALYZING: &str = "Analyzing the question...";
const MSG_PLANNING_DONE: &str = "Searching for related questions...";
const MSG_SEARCH_DONE: &str = "Web search completed";

const FAIL_NO_PLAN: &str = "I couldn't understand the question.";
const FAIL_NO_RESULTS: &str = "No web search results found.";
const FAIL_TIMEOUT: &str = "Web search timeout";
const FAIL_INTERNAL: &str = "Web search failed";

/// Per-search-call credit estimate reported in the usage summary.
const CREDITS_PER_QUERY: u64 = 2;

/// Run the pipeline for one request. The returned stream yields protocol
/// events and is guaranteed to end with exactly one terminal event.
pub fn run(state: AppState, request: QueryRequest) -> impl Stream<Item = Event> + Send {
    ensure_single_terminal(run_inner(state, request))
}

/// Wrap the raw pipeline so that nothing follows a terminal event and a
/// stream that dries up without one still fails cleanly.
fn ensure_single_terminal<S>(inner: S) -> impl Stream<Item = Event> + Send
where
    S: Stream<Item = Event> + Send + 'static,
{
    stream! {
        let mut inner = Box::pin(inner);
        let mut terminated = false;
        while let Some(event) = inner.next().await {
            let terminal = event.is_terminal();
            yield event;
            if terminal {
                terminated = true;
                break;
            }
        }
        if terminated {
            // Keep polling so work scheduled after the terminal event
            // (document-store writes) still runs; nothing more is emitted.
            while inner.next().await.is_some() {}
        } else {
            yield Event::failure(FAIL_INTERNAL);
        }
    }
}

fn run_inner(state: AppState, mut request: QueryRequest) -> impl Stream<Item = Event> + Send {
    stream! {
        let _permit = state.semaphore().acquire_owned().await.ok();
        request.normalize();

        let lang = language_info(&request.language);
        if request.return_process {
            yield Event::processing(MSG_ANALYZING);
        }

        if request.query.is_empty() {
            yield Event::failure(FAIL_NO_PLAN);
            return;
        }

        // PLAN
        let planner = QueryPlanner::new(state.llm(), state.config().query_model.as_str());
        let outcome = planner
            .plan(
                &request.query,
                &request.messages,
                &request.language,
                request.search_type.query_kind(),
                Utc::now(),
            )
            .await;
        let query_usage = outcome.usage;
        if outcome.plans.is_empty() {
            yield Event::failure(FAIL_NO_PLAN);
            return;
        }

        if request.return_process {
            yield Event::processing(MSG_PLANNING_DONE);
        }

        // SEARCH (skipped in URL-only mode: the URL itself is the hit)
        let backend = state.search_provider().backend();
        let (hits, search_credits) = if outcome.url_only {
            let hit = SearchHit {
                url: request.query.clone(),
                language: "ko".to_string(),
                kind: "search".to_string(),
                ..SearchHit::default()
            };
            (vec![hit], 0)
        } else {
            let options = SearchOptions {
                use_youtube_transcript: request.use_youtube_transcript,
                top_k: request.top_k.limit(),
                ..SearchOptions::default()
            };
            let client = SearchClient::new(state.search_provider(), options);
            let hits = client
                .multiple_search(&outcome.plans, DEFAULT_SIMHASH_THRESHOLD)
                .await;
            (hits, CREDITS_PER_QUERY * outcome.plans.len() as u64)
        };
        if hits.is_empty() {
            yield Event::failure(FAIL_NO_RESULTS);
            return;
        }

        if request.return_process {
            yield Event::processing(format!("Searching {} search results...", hits.len()));
        }

        // EXTRACT ∥ OUTLINE
        let crawler = Crawler::new(state.fetcher().clone(), state.registry(), state.store());
        let outline_gen = OutlineGenerator::new(state.llm(), state.config().outline_model.as_str());

        let (outline, docs) = if outcome.url_only {
            let doc = crawler.crawl(&hits[0]).await;
            let outline = outline_gen
                .generate(&request.query, &doc.content, lang.name)
                .await;
            (outline, vec![doc])
        } else {
            let merged_query = outcome
                .plans
                .iter()
                .map(|p| p.query.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let merged_content: String = hits
                .iter()
                .map(|h| format!("{}: {}\n", h.title, h.snippet))
                .collect();
            tokio::join!(
                outline_gen.generate(&merged_query, &merged_content, lang.name),
                crawler.multiple_crawl(&hits)
            )
        };
        let outline_usage = outline.usage;
        let sub_titles = outline.sub_titles;

        if request.return_process {
            yield Event::processing(MSG_SEARCH_DONE);
        }

        // ANSWER
        let sub_titles_json =
            serde_json::to_string(&sub_titles).unwrap_or_else(|_| "[]".to_string());
        let docs_json = serde_json::to_string(&docs).unwrap_or_else(|_| "[]".to_string());
        let today = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let answer_prompt = render(
            ANSWER_PROMPT,
            &[
                ("persona_prompt", request.persona_prompt.as_str()),
                ("custom_prompt", request.custom_prompt.as_str()),
                ("target_language", lang.name),
                ("target_nuance", request.target_nuance.as_str()),
                ("reference_label", lang.source_tag),
                ("today_date", today.as_str()),
                ("sub_titles", sub_titles_json.as_str()),
                ("prompt_web_search", docs_json.as_str()),
            ],
        );

        let mut messages: Vec<Message> = request
            .messages
            .iter()
            .map(|m| Message::from_wire(&m.role, m.content.as_str()))
            .collect();
        messages.push(Message::user(answer_prompt));
        let answer_request = CompletionRequest::new(state.config().answer_model.as_str(), messages)
            .with_max_tokens(8000)
            .with_temperature(1.0);

        let mut answer_usage = TokenUsage::default();
        let mut answer_content = String::new();

        if request.stream {
            match state.llm().complete_stream(answer_request).await {
                Ok(mut chunks) => {
                    while let Some(chunk) = chunks.next().await {
                        match chunk {
                            Ok(StreamChunk::Delta(delta)) => {
                                answer_content.push_str(&delta);
                                yield Event::streaming(delta);
                            }
                            Ok(StreamChunk::Usage(usage)) => {
                                answer_usage += usage;
                                break;
                            }
                            Err(IntelligenceError::Timeout) => {
                                yield Event::failure(FAIL_TIMEOUT);
                                return;
                            }
                            Err(e) => {
                                warn!(error = %e, "answer stream failed mid-flight");
                                break;
                            }
                        }
                    }
                }
                Err(IntelligenceError::Timeout) => {
                    yield Event::failure(FAIL_TIMEOUT);
                    return;
                }
                Err(e) => {
                    // The stream yields nothing; the summary reports zero
                    // usage and an empty answer.
                    warn!(error = %e, "answer stream could not start");
                }
            }
        } else {
            match state.llm().complete(answer_request).await {
                Ok(response) => {
                    answer_content = response.content;
                    answer_usage += response.usage;
                }
                Err(IntelligenceError::Timeout) => {
                    yield Event::failure(FAIL_TIMEOUT);
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "answer generation failed");
                }
            }
        }

        // SUMMARY
        let models = vec![
            ModelUsage {
                model: model_id(&state.config().query_model),
                usage: query_usage,
            },
            ModelUsage {
                model: model_id(&state.config().outline_model),
                usage: outline_usage,
            },
            ModelUsage {
                model: model_id(&state.config().answer_model),
                usage: answer_usage,
            },
            ModelUsage {
                model: ModelId::new(backend.as_str(), backend.as_str(), backend.as_str()),
                usage: TokenUsage::new(search_credits, 0),
            },
        ];
        let metadata = AnswerMetadata {
            queries: outcome.plans.iter().map(|p| p.query.clone()).collect(),
            sub_titles,
        };
        yield Event::complete(answer_content, metadata, models);

        // Persist crawled documents after the terminal event; writes are
        // not surfaced to the client.
        if let Some(store) = state.store() {
            if let Err(e) = store.put_bulk(&docs).await {
                warn!(error = %e, "bulk persist failed");
            }
        }
    }
}
