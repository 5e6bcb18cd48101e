//! Result types for the extraction stage.

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// OCR text of one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u8,
    /// Set when the page could not be read; `text` is empty then.
    pub error: Option<PageError>,
}

/// Document-level metadata read from the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Counters for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    pub processed_pages: usize,
    pub failed_pages: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_duration_ms: u64,
    pub render_duration_ms: u64,
    pub ocr_duration_ms: u64,
}

/// Everything the extraction stage produced, pages in page order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub pages: Vec<PageText>,
    pub metadata: DocumentMetadata,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// Texts of the pages that were read successfully, in page order.
    pub fn texts(&self) -> Vec<&str> {
        self.pages
            .iter()
            .filter(|p| p.error.is_none())
            .map(|p| p.text.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texts_skip_failed_pages() {
        let output = ExtractionOutput {
            pages: vec![
                PageText {
                    page_num: 1,
                    text: "one".into(),
                    ..Default::default()
                },
                PageText {
                    page_num: 2,
                    error: Some(PageError::RenderFailed {
                        page: 2,
                        detail: "bad".into(),
                    }),
                    ..Default::default()
                },
                PageText {
                    page_num: 3,
                    text: "three".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(output.texts(), vec!["one", "three"]);
    }
}
