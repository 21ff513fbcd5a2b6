//! Prompt templates. Placeholders use `{name}` and are filled by
//! [`render`]; keeping them as flat constants makes the wording easy to
//! review and diff.

/// Stateless query planning. The model must answer with a JSON object
/// whose values are `[query, type, language, period]` arrays.
pub const PLAN_PROMPT: &str = r#"You are a search query planner for a web search engine.
Current date: {date}

Rewrite the user's question into {num_samples} web search queries that together cover the information needed to answer it. Vary the wording and angle; do not repeat the same query.

For each query choose:
- "type": one of Search, News, Scholar, Videos, Images, Places, Shopping
- "language": the ISO 639-1 code best suited for finding results
- "period": one of "Any time", "Past hour", "Past 24 hours", "Past week", "Past month", "Past year"

Respond with a single JSON object mapping "1", "2", ... to arrays of the form [query, type, language, period]. No other keys, no commentary.

Question: {query}"#;

/// History-aware query planning.
pub const PLAN_PROMPT_HISTORY: &str = r#"You are a search query planner for a web search engine.
Current date: {date}

Conversation so far:
{history}

Considering the conversation, rewrite the user's latest question into {num_samples} web search queries that together cover the information needed to answer it. Resolve pronouns and references using the history. Vary the wording and angle; do not repeat the same query.

For each query choose:
- "type": one of Search, News, Scholar, Videos, Images, Places, Shopping
- "language": the ISO 639-1 code best suited for finding results
- "period": one of "Any time", "Past hour", "Past 24 hours", "Past week", "Past month", "Past year"

Respond with a single JSON object mapping "1", "2", ... to arrays of the form [query, type, language, period]. No other keys, no commentary.

Question: {query}"#;

/// Sub-heading proposal from merged search snippets (or, in URL-only
/// mode, from the crawled page itself).
pub const OUTLINE_PROMPT: &str = r#"You draft the outline of an answer to a web search question.

Question: {query}

Search results:
{content}

Propose up to 6 short sub-headings, in {target_language}, that would structure a thorough answer. Only include sub-headings supported by the search results.

Respond with a single JSON object: {"sub_titles": ["...", "..."]}. No other keys, no commentary."#;

/// Final answer generation over the crawled documents.
pub const ANSWER_PROMPT: &str = r#"{persona_prompt}

{custom_prompt}

You answer the user's question using the web documents below. Today is {today_date}.

Rules:
- Write the answer in {target_language} with a {target_nuance} tone, in Markdown.
- Structure the answer around these sub-headings where they fit: {sub_titles}
- Ground every claim in the documents; do not invent facts.
- Cite the documents you used at the end under the heading "{reference_label}", as a list of titles with their URLs.
- If the documents do not answer the question, say so briefly.

Web documents (JSON):
{prompt_web_search}"#;

/// Fill `{name}` placeholders. Unknown placeholders are left untouched so
/// a template typo shows up in output rather than vanishing.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_placeholders() {
        let out = render("ask {query} on {date}", &[("query", "x"), ("date", "today")]);
        assert_eq!(out, "ask x on today");
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        assert_eq!(render("{missing}", &[]), "{missing}");
    }

    #[test]
    fn templates_mention_their_placeholders() {
        for placeholder in ["{query}", "{date}", "{num_samples}"] {
            assert!(PLAN_PROMPT.contains(placeholder));
            assert!(PLAN_PROMPT_HISTORY.contains(placeholder));
        }
        assert!(PLAN_PROMPT_HISTORY.contains("{history}"));
        for placeholder in ["{query}", "{content}", "{target_language}"] {
            assert!(OUTLINE_PROMPT.contains(placeholder));
        }
        for placeholder in [
            "{persona_prompt}",
            "{custom_prompt}",
            "{target_language}",
            "{target_nuance}",
            "{reference_label}",
            "{today_date}",
            "{sub_titles}",
            "{prompt_web_search}",
        ] {
            assert!(ANSWER_PROMPT.contains(placeholder));
        }
    }
}
