//! Document Text Extractor: plain text out of a stored resume.
//!
//! PDF goes through `pdf-extract` (page text in document order). DOC/DOCX
//! are opened as OOXML packages and walked as a `DocNode` tree. Any other
//! extension yields empty text.

use thiserror::Error;
use tracing::info;

use crate::storage::{ResumeStorage, StorageError};

pub mod document_tree;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read resume: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse PDF: {0}")]
    Pdf(String),

    #[error("failed to open Word document: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("malformed Word document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Word document has no body")]
    MissingBody,

    #[error("text extraction aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Pdf,
    Word,
    Unsupported,
}

impl DocFormat {
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => DocFormat::Pdf,
            "doc" | "docx" => DocFormat::Word,
            _ => DocFormat::Unsupported,
        }
    }

    pub fn is_supported(self) -> bool {
        self != DocFormat::Unsupported
    }
}

/// Lowercased extension of a file name or storage key, if any.
pub fn extension_of(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Extracts text from the resume stored under `key`.
///
/// Unsupported formats return an empty string without touching storage.
/// Parsing runs on the blocking pool; the file bytes are dropped as soon
/// as the text is out.
pub async fn extract(
    storage: &dyn ResumeStorage,
    key: &str,
    extension: &str,
) -> Result<String, ExtractionError> {
    let format = DocFormat::from_extension(extension);
    if !format.is_supported() {
        info!("No text extractor for '.{extension}', continuing with empty resume text");
        return Ok(String::new());
    }

    let bytes = storage.get(key).await?;
    let text = tokio::task::spawn_blocking(move || extract_from_bytes(&bytes, format))
        .await
        .map_err(|e| ExtractionError::Aborted(e.to_string()))??;

    info!("Extracted {} characters from {key}", text.len());
    Ok(text)
}

pub fn extract_from_bytes(bytes: &[u8], format: DocFormat) -> Result<String, ExtractionError> {
    match format {
        DocFormat::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))
        }
        DocFormat::Word => {
            let sections = document_tree::parse_docx(bytes)?;
            Ok(document_tree::collect_text(&sections))
        }
        DocFormat::Unsupported => Ok(String::new()),
    }
}
