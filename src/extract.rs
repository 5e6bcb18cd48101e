//! Extraction entry points: PDF → page texts → Braille document.
//!
//! The upstream half of a session is async (pdfium in `spawn_blocking`,
//! concurrent OCR calls); the Braille half is plain synchronous code. The
//! functions here run the async half and hand the page texts to
//! [`normalize`] and [`transcode`].

use crate::config::ReaderConfig;
use crate::error::{PageError, ReaderError};
use crate::output::{DocumentMetadata, ExtractionOutput, ExtractionStats, PageText};
use crate::pipeline::normalize::normalize;
use crate::pipeline::transcode::{transcode, Document};
use crate::pipeline::{encode, input, ocr, render};
use edgequake_llm::{ImageData, LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Page separator in pre-extracted text files (`pdftotext` writes one per page).
pub const FORM_FEED: char = '\u{000C}';

/// Default OCR model when a provider is named without one.
const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Extract the text of every selected page of a PDF.
///
/// `input_str` may be a directory (the newest PDF inside is used), a file
/// path, or an HTTP/HTTPS URL.
///
/// # Errors
/// Returns `Err(ReaderError)` only for fatal errors:
/// - no PDF in the folder / file not found / permission denied
/// - not a valid PDF, wrong password
/// - every page failed
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ReaderConfig,
) -> Result<ExtractionOutput, ReaderError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();

    // ── Step 2: Get/create provider ──────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 3: Metadata and page selection ──────────────────────────────
    let metadata = render::extract_metadata(&pdf_path, config).await?;
    let total_pages = metadata.page_count;
    info!("PDF has {} pages", total_pages);

    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(ReaderError::PageOutOfRange {
            page: 0,
            total: total_pages,
        });
    }
    debug!("Selected {} pages", page_indices.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(page_indices.len());
    }

    // ── Step 4: Rasterise ────────────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = render::render_pages(&pdf_path, config, &page_indices).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered {} pages in {}ms",
        rendered.len(),
        render_duration_ms
    );

    // ── Step 5: Encode ───────────────────────────────────────────────────
    let mut pages: Vec<PageText> = Vec::new();
    let mut encoded: Vec<(usize, ImageData)> = Vec::with_capacity(rendered.len());
    for (idx, img) in &rendered {
        match encode::encode_page(img) {
            Ok(data) => encoded.push((*idx, data)),
            Err(e) => {
                warn!("Failed to encode page {}: {}", idx + 1, e);
                pages.push(PageText {
                    page_num: idx + 1,
                    error: Some(PageError::RenderFailed {
                        page: idx + 1,
                        detail: e.to_string(),
                    }),
                    ..PageText::default()
                });
            }
        }
    }

    // ── Step 6: OCR ──────────────────────────────────────────────────────
    let ocr_start = Instant::now();
    pages.extend(transcribe_concurrent(&provider, &encoded, config).await);
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    // Reading order is page order, whatever order the calls finished in.
    pages.sort_by_key(|p| p.page_num);

    // ── Step 7: Stats ────────────────────────────────────────────────────
    let processed = pages.iter().filter(|p| p.error.is_none()).count();
    let failed = pages.len() - processed;

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(page_indices.len(), processed);
    }

    if processed == 0 {
        let first_error = pages
            .iter()
            .find_map(|p| p.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());

        return Err(ReaderError::AllPagesFailed {
            total: pages.len(),
            retries: config.max_retries,
            first_error,
        });
    }

    let stats = ExtractionStats {
        total_pages,
        processed_pages: processed,
        failed_pages: failed,
        total_input_tokens: pages.iter().map(|p| p.input_tokens as u64).sum(),
        total_output_tokens: pages.iter().map(|p| p.output_tokens as u64).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        ocr_duration_ms,
    };

    info!(
        "Extraction complete: {}/{} pages, {}ms total",
        processed,
        page_indices.len(),
        stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        pages,
        metadata,
        stats,
    })
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ReaderConfig,
) -> Result<ExtractionOutput, ReaderError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReaderError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Read PDF metadata without OCR. Needs no API key.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ReaderConfig,
) -> Result<DocumentMetadata, ReaderError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    render::extract_metadata(resolved.path(), config).await
}

/// Extract, normalise and transcode in one go.
///
/// An empty document is a valid result: the source had no readable text
/// once credit pages were removed.
pub async fn prepare_document(
    input_str: impl AsRef<str>,
    config: &ReaderConfig,
) -> Result<Document, ReaderError> {
    let output = extract(input_str, config).await?;
    Ok(document_from_pages(&output.texts()))
}

/// Normalise page texts and transcode the result.
pub fn document_from_pages<S: AsRef<str>>(pages: &[S]) -> Document {
    let text = normalize(pages);
    debug!("Normalised text: {} chars", text.len());
    transcode(&text)
}

/// Load pre-extracted text, one page per form-feed-separated chunk.
pub fn load_text_pages(path: &Path) -> Result<Vec<String>, ReaderError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReaderError::TextReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_pages(&raw))
}

fn split_pages(raw: &str) -> Vec<String> {
    raw.split(FORM_FEED).map(str::to_string).collect()
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, ReaderError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ReaderError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the OCR provider, from most-specific to least-specific:
///
/// 1. a pre-built provider in the config,
/// 2. a named provider (+ optional model),
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL` when both are set,
/// 4. `ProviderFactory::from_env` auto-detection.
fn resolve_provider(config: &ReaderConfig) -> Result<Arc<dyn LLMProvider>, ReaderError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ReaderError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No OCR provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY or use --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

async fn transcribe_concurrent(
    provider: &Arc<dyn LLMProvider>,
    pages: &[(usize, ImageData)],
    config: &ReaderConfig,
) -> Vec<PageText> {
    let total_pages = pages.len();
    stream::iter(pages.iter().map(|(idx, img_data)| {
        let provider = Arc::clone(provider);
        let page_num = idx + 1;
        let img = img_data.clone();
        async move {
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_start(page_num, total_pages);
            }
            let result = ocr::transcribe_page(&provider, page_num, img, config).await;
            if let Some(ref cb) = config.progress_callback {
                match &result.error {
                    None => cb.on_page_complete(page_num, total_pages, result.text.len()),
                    Some(e) => cb.on_page_error(page_num, total_pages, &e.to_string()),
                }
            }
            result
        }
    }))
    .buffer_unordered(config.concurrency)
    .collect()
    .await
}
