//! Document Extractor: turns an uploaded PDF or Word file into plain text.
//!
//! Parsing is CPU-bound and runs inside `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    #[error("error extracting text from {kind}: {message}")]
    Extraction {
        kind: DocumentKind,
        message: String,
    },
}

/// Supported upload formats, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "PDF"),
            DocumentKind::Word => write!(f, "Word document"),
        }
    }
}

impl DocumentKind {
    /// Maps a path's (case-insensitive) extension to a document kind.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" | "doc" => Ok(DocumentKind::Word),
            _ => Err(ExtractError::UnsupportedFormat(format!(".{extension}"))),
        }
    }
}

/// Reads the file at `path` and returns its text content.
pub async fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_path(path)?;

    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractError::NotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(ExtractError::Extraction {
                kind,
                message: e.to_string(),
            })
        }
    };

    let text = tokio::task::spawn_blocking(move || extract_from_bytes(kind, &data))
        .await
        .map_err(|e| ExtractError::Extraction {
            kind,
            message: format!("extraction task failed: {e}"),
        })??;

    debug!(
        "Extracted {} characters from {}",
        text.len(),
        path.display()
    );
    Ok(text)
}

fn extract_from_bytes(kind: DocumentKind, data: &[u8]) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(data).map_err(|e| {
            ExtractError::Extraction {
                kind,
                message: e.to_string(),
            }
        }),
        DocumentKind::Word => extract_docx(data),
    }
}

/// Concatenates paragraph text, one paragraph per line.
fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(data).map_err(|e| ExtractError::Extraction {
        kind: DocumentKind::Word,
        message: e.to_string(),
    })?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}
