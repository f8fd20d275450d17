//! Document intake: turns uploaded resume and job-description files into text.
//!
//! PDF decoding runs on the blocking pool. A panic inside the PDF library
//! surfaces as a `DocumentError` for that one document.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// Characters of job description and resume text sent to the model.
pub const MAX_PROMPT_CHARS: usize = 4000;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("not a readable PDF: {0}")]
    InvalidPdf(String),

    #[error("PDF extraction aborted: {0}")]
    Aborted(String),

    #[error("document is empty")]
    Empty,
}

/// A named binary file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    /// True when the content type, file extension or magic bytes say PDF.
    pub fn is_pdf(&self) -> bool {
        let ct = self
            .content_type
            .as_deref()
            .unwrap_or("")
            .to_ascii_lowercase();
        ct.contains("application/pdf")
            || self.name.to_ascii_lowercase().ends_with(".pdf")
            || self.bytes.starts_with(b"%PDF-")
    }
}

/// Extracts the text of every page, in page order.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, DocumentError> {
    if bytes.is_empty() {
        return Err(DocumentError::Empty);
    }
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::InvalidPdf(e.to_string()))
}

/// Runs `extract_pdf_text` on the blocking pool.
pub async fn read_pdf(bytes: Bytes) -> Result<String, DocumentError> {
    let len = bytes.len();
    let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| DocumentError::Aborted(e.to_string()))??;
    debug!("Extracted {} chars from {} byte PDF", text.chars().count(), len);
    Ok(text)
}

/// Loads a job description from an uploaded file: PDF when it looks like
/// one, UTF-8 text otherwise.
pub async fn read_job_description(upload: Upload) -> Result<String, DocumentError> {
    let text = if upload.is_pdf() {
        read_pdf(upload.bytes).await?
    } else {
        String::from_utf8_lossy(&upload.bytes).into_owned()
    };

    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text)
}

/// Returns at most the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
