//! Model-name classification for usage reporting.

use undertow_types::ModelId;

/// Vendor owning a model name.
pub fn model_vendor(name: &str) -> &'static str {
    if name.starts_with("gpt") || name.starts_with("o1") || name.starts_with("o3") {
        "openai"
    } else if name.contains("claude") {
        "anthropic"
    } else if name.contains("gemini") {
        "google"
    } else {
        "unknown"
    }
}

/// Family label for a model name, most specific match first.
pub fn model_type(name: &str) -> &'static str {
    const FAMILIES: &[(&str, &str)] = &[
        ("gpt-4.1-nano", "gpt-4.1-nano"),
        ("gpt-4.1-mini", "gpt-4.1-mini"),
        ("gpt-4.1", "gpt-4.1"),
        ("gpt-4o", "gpt-4o"),
        ("o1", "o1"),
        ("claude-3-7-sonnet", "claude-3-7-sonnet"),
        ("claude-3-5-sonnet", "claude-3-5-sonnet"),
        ("claude-3-haiku", "claude-3-haiku"),
        ("gemini-2.5-flash", "gemini-2.5-flash"),
        ("gemini-2.0-flash", "gemini-2.0-flash"),
        ("gemini-1.5-flash", "gemini-1.5-flash"),
        ("gpt-3.5-turbo", "gpt-3.5-turbo"),
    ];
    FAMILIES
        .iter()
        .find(|(prefix, _)| name.contains(prefix))
        .map(|(_, family)| *family)
        .unwrap_or("unknown")
}

/// Full wire identity for a model name.
pub fn model_id(name: &str) -> ModelId {
    ModelId::new(model_vendor(name), model_type(name), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendors_resolve() {
        assert_eq!(model_vendor("gpt-4.1-nano-2025-04-14"), "openai");
        assert_eq!(model_vendor("claude-3-5-sonnet-20241022"), "anthropic");
        assert_eq!(model_vendor("gemini-2.0-flash"), "google");
        assert_eq!(model_vendor("llama-3"), "unknown");
    }

    #[test]
    fn families_prefer_most_specific() {
        assert_eq!(model_type("gpt-4.1-nano-2025-04-14"), "gpt-4.1-nano");
        assert_eq!(model_type("gpt-4.1-mini-2025-04-14"), "gpt-4.1-mini");
        assert_eq!(model_type("gpt-4.1-2025-04-14"), "gpt-4.1");
        assert_eq!(model_type("gpt-4o-mini"), "gpt-4o");
        assert_eq!(model_type("mystery-model"), "unknown");
    }

    #[test]
    fn model_id_combines_vendor_family_name() {
        let id = model_id("gpt-4.1-nano-2025-04-14");
        assert_eq!(id.vendor, "openai");
        assert_eq!(id.kind, "gpt-4.1-nano");
        assert_eq!(id.name, "gpt-4.1-nano-2025-04-14");
    }
}
