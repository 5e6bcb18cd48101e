//! CLI binary for pdf2braille.
//!
//! A thin shim over the library crate: maps CLI flags to `ReaderConfig`,
//! acquires the cell, and runs the reading session.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2braille::device::console::{ConsoleCell, IdleButtons};
use pdf2braille::device::gpio::{PinLayout, SysfsButtons, SysfsCell};
use pdf2braille::{
    document_from_pages, extract, interrupt, load_text_pages, ButtonInput, CellSession, Document,
    DotOutput, ExtractionProgressCallback, NavigationTiming, Navigator, PageSelection,
    ProgressCallback, ReaderConfig, SessionSummary, SharedCell, SystemClock, VirtualClock,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── OCR progress bar ─────────────────────────────────────────────────────────

/// Live progress bar for the OCR stage. Pages may complete out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        self.bar.set_length(total_pages as u64);
        self.bar.set_prefix("Reading pages");
    }

    fn on_page_complete(&self, _page_num: usize, _total: usize, _text_len: usize) {
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(error)
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} pages read",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages read  ({} failed)",
                red("⚠"),
                success_count,
                total_pages,
                failed
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Read the newest PDF in ./PDF on the GPIO cell
  pdf2braille

  # Dry run on the terminal, no waiting
  pdf2braille --device console --instant book.pdf

  # Skip OCR: pages separated by form feeds (pdftotext output)
  pdf2braille --text-file book.txt --device console

  # Show what would be displayed
  pdf2braille --text-file book.txt --transcode-only --json

HARDWARE (BCM numbering):
  Dots 1-6   GPIO 14, 15, 18, 23, 24, 25   (active low)
  NEXT       GPIO 20                       (pulled up, LOW = pressed)
  BACK       GPIO 21                       (pulled up, LOW = pressed)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (OCR)
  ANTHROPIC_API_KEY       Anthropic API key (OCR)
  GEMINI_API_KEY          Google Gemini API key (OCR)
  EDGEQUAKE_LLM_PROVIDER  Override provider
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Directory containing libpdfium
  RUST_LOG                Log filter, e.g. pdf2braille=debug
"#;

/// Read scanned PDFs one Braille cell at a time.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2braille",
    version,
    about = "Read scanned PDFs one Braille cell at a time",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder (newest PDF is read), PDF path, or HTTP/HTTPS URL.
    #[arg(default_value = "PDF", env = "PDF2BRAILLE_INPUT")]
    input: String,

    /// Output device.
    #[arg(long, env = "PDF2BRAILLE_DEVICE", value_enum, default_value = "gpio")]
    device: DeviceArg,

    /// Offset added to BCM pin numbers (512 on recent Raspberry Pi kernels).
    #[arg(long, env = "PDF2BRAILLE_GPIO_BASE", default_value_t = 0)]
    gpio_base: u32,

    /// Auto-advance after this many milliseconds without a press.
    #[arg(long, env = "PDF2BRAILLE_TIMEOUT_MS", default_value_t = 3000)]
    timeout_ms: u64,

    /// A press must hold for this many milliseconds.
    #[arg(long, env = "PDF2BRAILLE_DEBOUNCE_MS", default_value_t = 50)]
    debounce_ms: u64,

    /// How long the cell stays flat between two symbols.
    #[arg(long, env = "PDF2BRAILLE_RESET_HOLD_MS", default_value_t = 4000)]
    reset_hold_ms: u64,

    /// Run the session on a virtual clock (no real waiting). Dry runs only.
    #[arg(long)]
    instant: bool,

    /// Read pre-extracted text (pages split on form feed) instead of a PDF.
    #[arg(long, env = "PDF2BRAILLE_TEXT_FILE")]
    text_file: Option<PathBuf>,

    /// Print the transcoded document and exit.
    #[arg(long)]
    transcode_only: bool,

    /// With --transcode-only: print JSON.
    #[arg(long)]
    json: bool,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2BRAILLE_PAGES", default_value = "all")]
    pages: String,

    /// Rendering DPI (72–400).
    #[arg(long, env = "PDF2BRAILLE_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// OCR model ID.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// OCR provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2BRAILLE_PASSWORD")]
    password: Option<String>,

    /// Number of concurrent OCR calls.
    #[arg(short, long, env = "PDF2BRAILLE_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Retries per page on OCR failure.
    #[arg(long, env = "PDF2BRAILLE_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Directory containing libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Disable the OCR progress bar.
    #[arg(long, env = "PDF2BRAILLE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2BRAILLE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2BRAILLE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DeviceArg {
    /// Linux sysfs GPIO.
    Gpio,
    /// Log each cell to the terminal; buttons never pressed.
    Console,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Text ─────────────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && cli.text_file.is_none();
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let pages: Vec<String> = match cli.text_file {
        Some(ref path) => load_text_pages(path).context("Failed to load text file")?,
        None => extract(&cli.input, &config)
            .await
            .context("Failed to extract text")?
            .texts()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let document = document_from_pages(&pages);

    if cli.transcode_only {
        print_document(&document, cli.json)?;
        return Ok(());
    }

    if document.is_empty() {
        eprintln!("No text to display in Braille.");
        return Ok(());
    }

    // ── Session ──────────────────────────────────────────────────────────
    let timing = config.timing;
    let instant = cli.instant;
    let summary = match cli.device {
        DeviceArg::Gpio => {
            let layout = PinLayout::default().with_base(cli.gpio_base);
            let cell = SysfsCell::open(&layout).context("Failed to open Braille cell")?;
            let buttons = SysfsButtons::open(&layout).context("Failed to open buttons")?;
            tokio::task::spawn_blocking(move || read_on(document, cell, buttons, timing, instant))
                .await
                .context("Reading session panicked")?
        }
        DeviceArg::Console => tokio::task::spawn_blocking(move || {
            read_on(document, ConsoleCell::new(), IdleButtons, timing, instant)
        })
        .await
        .context("Reading session panicked")?,
    };

    if !cli.quiet {
        eprintln!(
            "{} {} cells shown, {} button presses",
            green("✔"),
            summary.render_count(),
            summary
                .events
                .iter()
                .filter(|e| **e != pdf2braille::ButtonEvent::Timeout)
                .count()
        );
    }

    Ok(())
}

/// Run one session on `output`, with Ctrl-C routed to a full reset.
fn read_on<O, I>(
    document: Document,
    output: O,
    input: I,
    timing: NavigationTiming,
    instant: bool,
) -> SessionSummary
where
    O: DotOutput + Send + 'static,
    I: ButtonInput,
{
    let shared = SharedCell::new(output);
    if let Err(e) = interrupt::install(shared.clone()) {
        warn!("Could not set up Ctrl+C handler: {}", e);
    }
    let cell = CellSession::acquire(shared);

    if instant {
        Navigator::new(document, cell, input, VirtualClock::new(), timing).run()
    } else {
        Navigator::new(document, cell, input, SystemClock::new(), timing).run()
    }
}

fn print_document(document: &Document, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(document).context("Failed to serialise document")?
        );
    } else {
        println!("{}", document.symbols());
        println!("{}", document.to_unicode());
    }
    Ok(())
}

/// Map CLI args to `ReaderConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReaderConfig> {
    let mut builder = ReaderConfig::builder()
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .max_retries(cli.max_retries)
        .pages(parse_pages(&cli.pages)?)
        .input_timeout(Duration::from_millis(cli.timeout_ms))
        .debounce(Duration::from_millis(cli.debounce_ms))
        .reset_hold(Duration::from_millis(cli.reset_hold_ms));

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(ref dir) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start.trim().parse().context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;
        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!("Invalid page range '{}-{}': start must be <= end", start, end);
        }
        return Ok(PageSelection::Range(start, end));
    }

    if s.contains(',') {
        let pages = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        if pages.contains(&0) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1");
        }
        return Ok(PageSelection::Set(pages));
    }

    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }
    Ok(PageSelection::Single(page))
}
