//! PDF Text Extractor — page-ordered plain text from an uploaded resume.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("PDF parser crashed: {0}")]
    Worker(String),

    #[error("no extractable text found in PDF")]
    NoText,
}

/// Extracts the text of every page, in page order, joined by newlines and trimmed.
///
/// PDF parsing is CPU-bound and the parser is known to panic on some malformed
/// documents, so it runs on the blocking pool and a panic surfaces as
/// `ExtractionError::Worker`.
pub async fn extract_text(pdf: Bytes) -> Result<String, ExtractionError> {
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&pdf)
            .map_err(|e| ExtractionError::Pdf(e.to_string()))
    })
    .await
    .map_err(|e| ExtractionError::Worker(e.to_string()))??;

    debug!("Extracted {} page(s) from PDF", pages.len());

    let text = join_pages(&pages);
    if text.is_empty() {
        return Err(ExtractionError::NoText);
    }
    Ok(text)
}

/// Joins per-page text with `\n`. Each page is trimmed and pages without text
/// are skipped, so blank pages never produce runs of empty lines.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
