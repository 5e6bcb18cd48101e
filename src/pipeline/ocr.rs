//! OCR: send one page image to a vision model and get its text back.
//!
//! The model is used as a plain transcription engine; the prompt lives in
//! [`crate::prompts`]. Transient failures (429/503, timeouts) are retried
//! with exponential backoff, `retry_backoff_ms * 2^attempt`.

use crate::config::ReaderConfig;
use crate::error::PageError;
use crate::output::PageText;
use crate::prompts::DEFAULT_OCR_PROMPT;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Transcribe a single rasterised page.
///
/// Always returns a `PageText`; a page that still fails after all retries
/// carries a [`PageError`] and empty text, so one bad page never costs the
/// reader the rest of the book.
pub async fn transcribe_page(
    provider: &Arc<dyn LLMProvider>,
    page_num: usize,
    image_data: ImageData,
    config: &ReaderConfig,
) -> PageText {
    let start = Instant::now();
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_OCR_PROMPT);

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images("", vec![image_data]),
    ];
    let options = build_options(config);
    let call_timeout = Duration::from_secs(config.api_timeout_secs);

    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Page {}: retry {}/{} after {}ms",
                page_num, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(call_timeout, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                let duration = start.elapsed();
                debug!(
                    "Page {}: {} chars, {} input tokens, {} output tokens, {:?}",
                    page_num,
                    response.content.len(),
                    response.prompt_tokens,
                    response.completion_tokens,
                    duration
                );

                return PageText {
                    page_num,
                    text: response.content,
                    input_tokens: response.prompt_tokens,
                    output_tokens: response.completion_tokens,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt as u8,
                    error: None,
                };
            }
            Ok(Err(e)) => {
                let err_msg = e.to_string();
                warn!("Page {}: attempt {} failed: {}", page_num, attempt + 1, err_msg);
                last_err = Some(err_msg);
            }
            Err(_) => {
                warn!(
                    "Page {}: attempt {} timed out after {}s",
                    page_num,
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(format!("timed out after {}s", config.api_timeout_secs));
            }
        }
    }

    PageText {
        page_num,
        duration_ms: start.elapsed().as_millis() as u64,
        retries: config.max_retries as u8,
        error: Some(PageError::OcrFailed {
            page: page_num,
            retries: config.max_retries as u8,
            detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
        }),
        ..PageText::default()
    }
}

fn build_options(config: &ReaderConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
