//! Generic HTML-to-text conversion for pages without a dedicated
//! extractor.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::text::{collapse_newlines, collapse_spaces};

// Chrome elements that never carry article text. The nonstandard names
// (navbar, menu, sidebar…) show up as custom tags on enough sites to be
// worth matching literally.
const STRIPPED_TAGS: &[&str] = &[
    "script",
    "style",
    "nav",
    "navbar",
    "navigation",
    "menu",
    "sidebar",
    "side-bar",
    "aside",
    "header",
    "footer",
    "noscript",
];

static DISPLAY_NONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)display:\s*none").expect("display pattern is a valid regex"));

/// Visible-text extractor for arbitrary HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericHtmlExtractor;

impl GenericHtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Strip chrome and hidden elements, then return the document's text
    /// with whitespace runs collapsed.
    pub fn convert(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut out = String::new();
        collect_visible_text(document.root_element(), &mut out);
        collapse_spaces(&collapse_newlines(&out))
    }
}

fn is_stripped(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if STRIPPED_TAGS.contains(&value.name()) {
        return true;
    }
    value
        .attr("style")
        .is_some_and(|style| DISPLAY_NONE.is_match(style))
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !is_stripped(child_el) {
                collect_visible_text(child_el, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_chrome() {
        let html = r#"
            <html><head><style>p{}</style></head><body>
            <nav>Menu</nav>
            <header>Site header</header>
            <p>First paragraph.</p>
            <script>var x = 1;</script>
            <p>Second paragraph.</p>
            <footer>Footer text</footer>
            </body></html>"#;
        let text = GenericHtmlExtractor::new().convert(html);
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second paragraph."));
        assert!(!text.contains("Menu"));
        assert!(!text.contains("Site header"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("Footer text"));
    }

    #[test]
    fn drops_hidden_elements() {
        let html = r#"<body><div style="display: none">secret</div><p>shown</p></body>"#;
        let text = GenericHtmlExtractor::new().convert(html);
        assert!(!text.contains("secret"));
        assert!(text.contains("shown"));
    }

    #[test]
    fn collapses_blank_runs() {
        let html = "<body><p>a</p>\n\n\n\n<p>b</p></body>";
        let text = GenericHtmlExtractor::new().convert(html);
        assert_eq!(text, "a\nb");
    }
}
