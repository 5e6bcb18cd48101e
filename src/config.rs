//! Configuration types for a reading session.
//!
//! Every knob, from rasterisation through OCR to the cell timing, lives in
//! [`ReaderConfig`], built via [`ReaderConfigBuilder`]. The CLI maps its flags
//! (each with a `PDF2BRAILLE_*` environment variable) onto the builder;
//! library callers set only what they care about and keep the defaults for
//! the rest.

use crate::error::ReaderError;
use crate::navigator::NavigationTiming;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for extracting a document and reading it on the cell.
///
/// # Example
/// ```rust
/// use pdf2braille::ReaderConfig;
/// use std::time::Duration;
///
/// let config = ReaderConfig::builder()
///     .dpi(200)
///     .input_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(config.timing.input_timeout, Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct ReaderConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 150.
    ///
    /// Book scans are mostly body text; 150 DPI keeps it legible to the
    /// vision model without oversized uploads.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// Number of pages sent to the OCR provider concurrently. Default: 4.
    pub concurrency: usize,

    /// OCR model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// OCR provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, uses `ProviderFactory::from_env()`.
    pub provider_name: Option<String>,

    /// Pre-constructed provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.0, transcription must be literal.
    pub temperature: f32,

    /// Maximum tokens the model may generate per page. Default: 4096.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient OCR failure. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom OCR prompt. If None, uses the built-in transcription prompt.
    pub system_prompt: Option<String>,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// Directory containing libpdfium. If None, `PDFIUM_LIB_PATH` and then the
    /// system library search path are tried.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-OCR-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Optional progress callback for per-page OCR events.
    pub progress_callback: Option<ProgressCallback>,

    /// Cell and button timing.
    pub timing: NavigationTiming,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            max_rendered_pixels: 2000,
            concurrency: 4,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.0,
            max_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            password: None,
            system_prompt: None,
            pages: PageSelection::default(),
            pdfium_lib_path: None,
            download_timeout_secs: 120,
            api_timeout_secs: 60,
            progress_callback: None,
            timing: NavigationTiming::default(),
        }
    }
}

impl fmt::Debug for ReaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("concurrency", &self.concurrency)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("pages", &self.pages)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("timing", &self.timing)
            .finish()
    }
}

impl ReaderConfig {
    /// Create a new builder for `ReaderConfig`.
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReaderConfig`].
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl fmt::Debug for ReaderConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ReaderConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn pdfium_lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(dir.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn timing(mut self, timing: NavigationTiming) -> Self {
        self.config.timing = timing;
        self
    }

    pub fn input_timeout(mut self, d: Duration) -> Self {
        self.config.timing.input_timeout = d;
        self
    }

    pub fn debounce(mut self, d: Duration) -> Self {
        self.config.timing.debounce = d;
        self
    }

    pub fn poll_interval(mut self, d: Duration) -> Self {
        self.config.timing.poll_interval = d;
        self
    }

    pub fn reset_hold(mut self, d: Duration) -> Self {
        self.config.timing.reset_hold = d;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReaderConfig, ReaderError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(ReaderError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.concurrency == 0 {
            return Err(ReaderError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        let t = &c.timing;
        if t.poll_interval.is_zero() {
            return Err(ReaderError::InvalidConfig(
                "Poll interval must be greater than zero".into(),
            ));
        }
        if t.debounce >= t.input_timeout {
            return Err(ReaderError::InvalidConfig(format!(
                "Debounce ({:?}) must be shorter than the input timeout ({:?})",
                t.debounce, t.input_timeout
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF to read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Read all pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reader_hardware() {
        let c = ReaderConfig::default();
        assert_eq!(c.timing.input_timeout, Duration::from_secs(3));
        assert_eq!(c.timing.debounce, Duration::from_millis(50));
        assert_eq!(c.timing.poll_interval, Duration::from_millis(10));
        assert_eq!(c.pages, PageSelection::All);
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = ReaderConfig::builder().dpi(10).build().unwrap();
        assert_eq!(c.dpi, 72);
    }

    #[test]
    fn builder_rejects_debounce_longer_than_timeout() {
        let err = ReaderConfig::builder()
            .input_timeout(Duration::from_millis(40))
            .debounce(Duration::from_millis(50))
            .build()
            .unwrap_err();
        assert!(matches!(err, ReaderError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_poll_interval() {
        assert!(ReaderConfig::builder()
            .poll_interval(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 9).to_indices(4), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2]
        );
    }
}
