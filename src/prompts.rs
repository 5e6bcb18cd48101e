//! The OCR prompt sent with every page image.
//!
//! The output goes straight into the normaliser and then to a reader's
//! fingertips one character at a time, so the model is asked for the printed
//! words only: no Markdown, no layout, no commentary. Callers can override it
//! via [`crate::config::ReaderConfig::system_prompt`].

/// Default system prompt for transcribing a page image to plain text.
pub const DEFAULT_OCR_PROMPT: &str = r#"You are an OCR engine. Transcribe the printed text on this page image.

Rules:
1. Output ONLY the text that is printed on the page, in reading order.
2. Plain text only: no Markdown, no HTML, no code fences.
3. Keep the original spelling, punctuation and digits exactly as printed.
4. Separate paragraphs with a blank line; join lines that were only wrapped.
5. Skip page numbers, running headers and running footers.
6. Do not describe images, do not summarise, do not add comments.
7. If the page carries no text, output nothing."#;
