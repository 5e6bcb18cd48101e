//! End-to-end tests for pdf2braille.
//!
//! The OCR tests render a real PDF and make live vision-model calls. They
//! are gated behind the `E2E_ENABLED` environment variable so they do not
//! run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=. cargo test --test e2e -- --nocapture
//!
//! Point `PDF2BRAILLE_E2E_PDF` at a scan to use something other than
//! `test_cases/sample.pdf`.

use pdf2braille::device::console::{ConsoleCell, IdleButtons};
use pdf2braille::{
    extract, inspect, prepare_document, CellSession, NavigationTiming, Navigator, PageSelection,
    ReaderConfig, ReaderError, VirtualClock,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn sample_pdf() -> PathBuf {
    std::env::var_os("PDF2BRAILLE_E2E_PDF")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/sample.pdf")
        })
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

// ── Input resolution (no pdfium, no network) ────────────────────────────────

#[tokio::test]
async fn test_empty_folder_has_no_source_document() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a pdf").unwrap();

    let config = ReaderConfig::default();
    let err = prepare_document(dir.path().to_string_lossy(), &config)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReaderError::NoSourceDocument { .. }),
        "got {err:?}"
    );
}

#[test]
fn test_inspect_nonexistent() {
    let config = ReaderConfig::default();
    let err = tokio_test::block_on(inspect("/nonexistent/book.pdf", &config)).unwrap_err();
    assert!(
        matches!(err, ReaderError::FileNotFound { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_fake_pdf_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("book.pdf");
    std::fs::write(&fake, "hello").unwrap();

    let config = ReaderConfig::default();
    let err = inspect(fake.to_string_lossy(), &config).await.unwrap_err();
    assert!(matches!(err, ReaderError::NotAPdf { .. }), "got {err:?}");
}

// ── Live OCR ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_sample() {
    let pdf = e2e_skip_unless_ready!(sample_pdf());
    let config = ReaderConfig::default();
    let meta = inspect(pdf.to_string_lossy(), &config).await.unwrap();
    assert!(meta.page_count > 0);
}

#[tokio::test]
async fn test_extract_first_page() {
    let pdf = e2e_skip_unless_ready!(sample_pdf());
    let config = ReaderConfig::builder()
        .pages(PageSelection::Single(1))
        .build()
        .unwrap();

    let output = extract(pdf.to_string_lossy(), &config).await.unwrap();
    assert_eq!(output.pages.len(), 1);
    assert_eq!(output.stats.failed_pages, 0);
    println!("Page 1 OCR:\n{}", output.pages[0].text);
}

#[tokio::test]
async fn test_read_sample_on_console() {
    let pdf = e2e_skip_unless_ready!(sample_pdf());
    let config = ReaderConfig::builder()
        .pages(PageSelection::Range(1, 2))
        .build()
        .unwrap();

    let document = prepare_document(pdf.to_string_lossy(), &config)
        .await
        .unwrap();
    println!("{}", document.to_unicode());

    let len = document.len();
    let clock = VirtualClock::new();
    let cell = CellSession::acquire(ConsoleCell::new());
    let summary = Navigator::new(
        document,
        cell,
        IdleButtons,
        &clock,
        NavigationTiming::default(),
    )
    .run();
    assert_eq!(summary.render_count(), len);
}
