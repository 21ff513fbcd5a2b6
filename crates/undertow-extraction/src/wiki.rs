//! Wikipedia article extractor: editorial chrome removed, `wikitable`
//! blocks rendered as Markdown tables in place, reference marks stripped.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use undertow_fetch::HttpFetcher;

use crate::text::{collapse_blank_lines, strip_reference_marks};
use crate::Extractor;

const SKIPPED_CLASSES: &[&str] = &[
    "mw-editsection",
    "mw-empty-elt",
    "noprint",
    "mw-jump-link",
];

const SKIPPED_IDS: &[&str] = &["mw-navigation", "mw-panel", "footer", "catlinks", "mw-head"];

pub struct WikipediaExtractor;

impl WikipediaExtractor {
    fn parse(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let title = Selector::parse("h1#firstHeading")
            .ok()
            .and_then(|s| document.select(&s).next())
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let Some(content) = Selector::parse("div#mw-content-text")
            .ok()
            .and_then(|s| document.select(&s).next())
        else {
            return String::new();
        };

        let mut out = String::new();
        walk(content, &mut out);

        let body = strip_reference_marks(&collapse_blank_lines(&out));
        if title.is_empty() {
            body
        } else {
            format!("{title}\n\n{body}").trim().to_string()
        }
    }
}

fn is_skipped(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if matches!(value.name(), "script" | "style") {
        return true;
    }
    if value.classes().any(|c| SKIPPED_CLASSES.contains(&c)) {
        return true;
    }
    value.id().is_some_and(|id| SKIPPED_IDS.contains(&id))
}

fn is_wikitable(element: ElementRef<'_>) -> bool {
    element.value().name() == "table" && element.value().classes().any(|c| c == "wikitable")
}

fn walk(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        if is_skipped(child_el) {
            continue;
        }
        if is_wikitable(child_el) {
            out.push('\n');
            out.push_str(&table_to_markdown(child_el));
            out.push('\n');
            continue;
        }
        walk(child_el, out);
        if matches!(
            child_el.value().name(),
            "p" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "tr"
        ) {
            out.push('\n');
        }
    }
}

/// Render a table element as a Markdown pipe table. The first row supplies
/// the header.
fn table_to_markdown(table: ElementRef<'_>) -> String {
    let Ok(row_selector) = Selector::parse("tr") else {
        return String::new();
    };
    let Ok(cell_selector) = Selector::parse("th, td") else {
        return String::new();
    };

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in table.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| {
                cell.text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    if rows.is_empty() {
        return String::new();
    }

    let mut md = String::new();
    let header = &rows[0];
    md.push_str(&format!("| {} |\n", header.join(" | ")));
    md.push_str(&format!("|{}\n", " --- |".repeat(header.len())));
    for row in &rows[1..] {
        md.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    md
}

#[async_trait]
impl Extractor for WikipediaExtractor {
    fn can_handle(&self, url: &str) -> bool {
        url.contains("wikipedia.org")
    }

    async fn extract(&self, url: &str, fetcher: &HttpFetcher) -> String {
        match fetcher.get_text(url).await {
            Ok(html) => self.parse(&html),
            Err(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div id="mw-head">chrome</div>
        <h1 id="firstHeading">Rust (programming language)</h1>
        <div id="mw-content-text">
          <p>Rust is a systems language.<sup class="noprint">edit</sup></p>
          <span class="mw-editsection">[edit]</span>
          <p>It emphasizes safety.[1]</p>
          <table class="wikitable">
            <tr><th>Year</th><th>Version</th></tr>
            <tr><td>2015</td><td>1.0</td></tr>
            <tr><td>2021</td><td>2021 edition</td></tr>
          </table>
        </div>
        <div id="footer">footer chrome</div>
        </body></html>"#;

    #[test]
    fn extracts_title_and_body_without_chrome() {
        let text = WikipediaExtractor.parse(PAGE);
        assert!(text.starts_with("Rust (programming language)"));
        assert!(text.contains("Rust is a systems language."));
        assert!(!text.contains("[edit]"));
        assert!(!text.contains("footer chrome"));
        assert!(!text.contains("chrome\n"));
    }

    #[test]
    fn reference_marks_are_removed() {
        let text = WikipediaExtractor.parse(PAGE);
        assert!(text.contains("It emphasizes safety."));
        assert!(!text.contains("[1]"));
    }

    #[test]
    fn wikitables_become_markdown() {
        let text = WikipediaExtractor.parse(PAGE);
        assert!(text.contains("| Year | Version |"));
        assert!(text.contains("| --- | --- |"));
        assert!(text.contains("| 2015 | 1.0 |"));
    }

    #[test]
    fn missing_content_div_yields_empty() {
        assert_eq!(WikipediaExtractor.parse("<html><body></body></html>"), "");
    }
}
