//! Text normalisation: OCR page texts → one clean string ready for transcoding.
//!
//! OCR output carries two kinds of noise that matter for a one-cell reader:
//!
//! - **Whole pages that are not the book.** Copyright notices, ISBN blocks,
//!   "printed in" colophons and scanner credits would cost a reader minutes of
//!   cell-by-cell reading for no content. Any page that mentions one of the
//!   [`CREDIT_KEYWORDS`] is dropped entirely.
//! - **Typographic variants.** Curly quotes and stray vertical bars (the usual
//!   misread of a capital I) have no entry in the Braille table and would
//!   silently vanish during transcoding.
//!
//! ## Rule Order
//!
//! Page filtering runs first, on each page's raw text. The survivors are
//! joined with `\n` and the remaining rules run over the joined string:
//! character substitution, whitespace collapse, newline collapse, trim.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lowercase substrings that mark a credit/copyright page.
pub const CREDIT_KEYWORDS: &[&str] = &[
    "all rights reserved",
    "isbn",
    "printed in",
    "copyright",
    "scanned by",
    "edition",
    "publisher",
    "press",
    "www",
    ".com",
    "©",
];

/// Filter credit pages, join the rest, and clean the result.
///
/// Empty input (or input made only of credit pages) yields an empty string.
pub fn normalize<S: AsRef<str>>(pages: &[S]) -> String {
    let kept: Vec<&str> = pages
        .iter()
        .map(AsRef::as_ref)
        .filter(|page| !is_credit_page(page))
        .collect();
    clean_ocr_text(&kept.join("\n"))
}

/// Whether the page text mentions any credit keyword (case-insensitive).
pub fn is_credit_page(text: &str) -> bool {
    let lower = text.to_lowercase();
    CREDIT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Apply the character and whitespace rules to already-joined text.
pub fn clean_ocr_text(input: &str) -> String {
    let s = substitute_typographic_variants(input);
    let s = collapse_whitespace(&s);
    let s = collapse_newlines(&s);
    s.trim().to_string()
}

// ── Rule 1: Typographic variants ─────────────────────────────────────────────

fn substitute_typographic_variants(input: &str) -> String {
    input
        .replace('|', "I")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}', '`'], "'")
}

// ── Rule 2: Runs of whitespace ───────────────────────────────────────────────

static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE_RUN.replace_all(input, " ").to_string()
}

// ── Rule 3: Runs of newlines ─────────────────────────────────────────────────

static RE_NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

fn collapse_newlines(input: &str) -> String {
    RE_NEWLINE_RUN.replace_all(input, "\n").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
