//! Generic PDF-to-text conversion.

use tracing::debug;

/// Number of pages read from the front of a document. Long PDFs are almost
/// always papers or reports whose substance is front-loaded.
const MAX_PAGES: usize = 10;

/// Text extractor for PDF bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericPdfExtractor;

impl GenericPdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of the first `min(10, page_count)` pages. Returns
    /// `""` for anything that does not parse as a PDF.
    pub fn convert(&self, data: &[u8]) -> String {
        if !data.starts_with(b"%PDF-") {
            return String::new();
        }
        let document = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            Err(e) => {
                debug!(error = %e, "pdf parse failed");
                return String::new();
            }
        };

        let page_numbers: Vec<u32> = document
            .get_pages()
            .keys()
            .copied()
            .take(MAX_PAGES)
            .collect();
        if page_numbers.is_empty() {
            return String::new();
        }

        match document.extract_text(&page_numbers) {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "pdf text extraction failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_bytes() {
        let extractor = GenericPdfExtractor::new();
        assert_eq!(extractor.convert(b"<html>not a pdf</html>"), "");
        assert_eq!(extractor.convert(b""), "");
    }

    #[test]
    fn rejects_truncated_header() {
        // Valid signature but no document behind it.
        assert_eq!(GenericPdfExtractor::new().convert(b"%PDF-1.7"), "");
    }
}
