//! URL detection helpers used by the planner short-circuit and for
//! harvesting URLs embedded in free text.

use once_cell::sync::Lazy;
use regex::Regex;

// http/https only; host is a dotted domain or an IPv4 literal, with an
// optional port and path.
const URL_PATTERN: &str =
    r"https?://(?:(?:[\w\-]+\.)+[\w\-]+|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/\S*)?";

static BARE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{URL_PATTERN}$")).expect("bare-url pattern is a valid regex")
});

static EMBEDDED_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(URL_PATTERN).expect("url pattern is a valid regex"));

/// True when the whole input is a single URL (no surrounding text, no
/// whitespace). This is what lets a pasted link skip query planning.
pub fn is_bare_url(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.contains(char::is_whitespace) {
        return false;
    }
    BARE_URL.is_match(trimmed)
}

/// Extract up to `max` distinct URLs from free text, preserving first
/// occurrence order.
pub fn extract_urls(text: &str, max: usize) -> Vec<String> {
    let mut seen = Vec::new();
    for m in EMBEDDED_URL.find_iter(text) {
        let url = m.as_str().to_string();
        if !seen.contains(&url) {
            seen.push(url);
            if seen.len() == max {
                break;
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_url_accepts_domains_ips_ports_paths() {
        assert!(is_bare_url("https://example.com"));
        assert!(is_bare_url("http://192.168.0.10:8000/portal/"));
        assert!(is_bare_url("https://docs.example.org/a/b?q=1"));
        assert!(is_bare_url("  https://example.com/x  "));
    }

    #[test]
    fn bare_url_rejects_text_and_other_schemes() {
        assert!(!is_bare_url("check https://example.com"));
        assert!(!is_bare_url("https://a.com https://b.com"));
        assert!(!is_bare_url("ftp://example.com"));
        assert!(!is_bare_url("file:///etc/passwd"));
        assert!(!is_bare_url("example.com"));
        assert!(!is_bare_url(""));
    }

    #[test]
    fn extract_urls_dedups_and_caps() {
        let text = "see https://a.com and https://b.com plus https://a.com \
                    then https://c.com and https://d.com";
        let urls = extract_urls(text, 3);
        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
    }

    #[test]
    fn extract_urls_empty_for_plain_text() {
        assert!(extract_urls("no links here", 3).is_empty());
    }
}
