//! Pipeline stages from a PDF to a Braille document.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and the upstream half (PDF → text) can be swapped out
//! entirely, e.g. for pre-extracted text files.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ ocr ──▶ normalize ──▶ transcode
//! (folder)  (pdfium)  (base64)   (VLM)   (cleanup)     (6-dot cells)
//! ```
//!
//! 1. [`input`]     — pick the newest PDF in a folder, or take a path/URL
//! 2. [`render`]    — rasterise selected pages in `spawn_blocking`
//! 3. [`encode`]    — grayscale PNG, base64-wrapped for the request body
//! 4. [`ocr`]       — page image → text with retry/backoff; the only stage
//!    with network I/O
//! 5. [`normalize`] — drop credit pages, fix OCR typography and whitespace
//! 6. [`transcode`] — text → ordered [`transcode::BrailleUnit`]s with number signs

pub mod encode;
pub mod input;
pub mod normalize;
pub mod ocr;
pub mod render;
pub mod transcode;
