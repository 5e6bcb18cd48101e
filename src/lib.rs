//! # pdf2braille
//!
//! Read a scanned book on a single refreshable Braille cell.
//!
//! A PDF is rasterised page by page, a vision model transcribes each page,
//! credit pages and OCR noise are removed, and the text is transcoded into
//! 6-dot Braille patterns. A reading session then raises one pattern at a
//! time on the cell; the reader steps with a NEXT and a BACK button, and the
//! session moves on by itself after a few idle seconds.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF folder
//!  │
//!  ├─ 1. Input      newest PDF in the folder (or a path / URL)
//!  ├─ 2. Render     rasterise pages via pdfium (spawn_blocking)
//!  ├─ 3. OCR        concurrent vision-model transcription
//!  ├─ 4. Normalise  drop credit pages, fix quotes and whitespace
//!  ├─ 5. Transcode  text → 6-dot cells, number signs before digit runs
//!  └─ 6. Navigate   one cell at a time, debounced buttons, auto-advance
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2braille::device::console::{ConsoleCell, IdleButtons};
//! use pdf2braille::device::CellSession;
//! use pdf2braille::{prepare_document, Navigator, ReaderConfig, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReaderConfig::default();
//!     let document = prepare_document("PDF", &config).await?;
//!
//!     let cell = CellSession::acquire(ConsoleCell::new());
//!     let summary = Navigator::new(document, cell, IdleButtons, SystemClock::new(), config.timing).run();
//!     eprintln!("{} cells shown", summary.render_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2braille` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod device;
pub mod error;
pub mod extract;
pub mod interrupt;
pub mod navigator;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageSelection, ReaderConfig, ReaderConfigBuilder};
pub use device::{Button, ButtonInput, CellSession, DotOutput, SharedCell};
pub use error::{PageError, ReaderError};
pub use extract::{
    document_from_pages, extract, extract_sync, inspect, load_text_pages, prepare_document,
};
pub use navigator::{
    ButtonEvent, Clock, Cursor, NavState, NavigationTiming, Navigator, SessionSummary, Step,
    SystemClock, VirtualClock,
};
pub use output::{DocumentMetadata, ExtractionOutput, ExtractionStats, PageText};
pub use pipeline::normalize::normalize;
pub use pipeline::transcode::{transcode, BrailleUnit, Document, DotPattern};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
