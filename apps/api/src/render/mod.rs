//! PDF Renderer: structured resume → presentation view → HTML (askama) → PDF.
//!
//! The HTML is written to a `temp_*.html` file beside the output, handed to a
//! [`PdfEngine`], and removed whether or not conversion succeeds. Output that
//! is missing or empty is reported as a failure and never returned as a path.

use std::path::PathBuf;

use thiserror::Error;

pub mod engine;
pub mod handlers;
pub mod presentation;
pub mod renderer;

pub use engine::{CommandPdfEngine, PdfEngine};
pub use renderer::{GeneratedPdf, PdfRenderer};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("I/O error while rendering: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF engine '{program}' failed: {message}")]
    Engine { program: String, message: String },

    #[error("PDF engine produced no file at {0}")]
    MissingOutput(PathBuf),

    #[error("PDF engine produced an empty file at {0}")]
    EmptyOutput(PathBuf),
}
