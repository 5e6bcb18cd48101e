//! PDF rasterisation: render selected pages to `DynamicImage` via pdfium.
//!
//! pdfium keeps thread-local state and is not async-safe, so all work runs
//! inside `tokio::task::spawn_blocking`. Output size is capped by
//! `max_rendered_pixels` on the longest edge regardless of the page's
//! physical size.

use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::output::DocumentMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming a directory that contains libpdfium.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to libpdfium: explicit directory, then `PDFIUM_LIB_PATH`, then the
/// system library.
fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, ReaderError> {
    let dir = lib_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from));

    let bindings = match dir {
        Some(dir) => {
            debug!("Binding pdfium from {}", dir.display());
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ReaderError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Rasterise selected pages of a PDF into images.
///
/// # Returns
/// A vector of `(page_index_0based, DynamicImage)` tuples.
pub async fn render_pages(
    pdf_path: &Path,
    config: &ReaderConfig,
    page_indices: &[usize],
) -> Result<Vec<(usize, DynamicImage)>, ReaderError> {
    let path = pdf_path.to_path_buf();
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();
    let lib_dir = config.pdfium_lib_path.clone();
    let indices = page_indices.to_vec();

    tokio::task::spawn_blocking(move || {
        render_pages_blocking(
            &path,
            lib_dir.as_deref(),
            max_pixels,
            password.as_deref(),
            &indices,
        )
    })
    .await
    .map_err(|e| ReaderError::Internal(format!("Render task panicked: {}", e)))?
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ReaderError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ReaderError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ReaderError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ReaderError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

fn render_pages_blocking(
    pdf_path: &Path,
    lib_dir: Option<&Path>,
    max_pixels: u32,
    password: Option<&str>,
    page_indices: &[usize],
) -> Result<Vec<(usize, DynamicImage)>, ReaderError> {
    let pdfium = bind_pdfium(lib_dir)?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(page_indices.len());

    for &idx in page_indices {
        if idx >= total_pages {
            warn!(
                "Skipping page {} (out of range, total={})",
                idx + 1,
                total_pages
            );
            continue;
        }

        let page = pages
            .get(idx as u16)
            .map_err(|e| ReaderError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ReaderError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push((idx, image));
    }

    Ok(results)
}

/// Read page count and title/author metadata without rendering pages.
pub async fn extract_metadata(
    pdf_path: &Path,
    config: &ReaderConfig,
) -> Result<DocumentMetadata, ReaderError> {
    let path = pdf_path.to_path_buf();
    let password = config.password.clone();
    let lib_dir = config.pdfium_lib_path.clone();

    tokio::task::spawn_blocking(move || {
        extract_metadata_blocking(&path, lib_dir.as_deref(), password.as_deref())
    })
    .await
    .map_err(|e| ReaderError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_metadata_blocking(
    pdf_path: &Path,
    lib_dir: Option<&Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, ReaderError> {
    let pdfium = bind_pdfium(lib_dir)?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata
            .get(tag)
            .map(|t| t.value().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}
