//! Concrete search backends.

mod brave;
mod duckduckgo;
mod serpapi;
mod serper;

pub use brave::BraveProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use serpapi::SerpApiProvider;
pub use serper::SerperProvider;

use serde_json::Value;

/// String field of a JSON object, empty when missing.
pub(crate) fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
