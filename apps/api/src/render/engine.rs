use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::RenderError;

/// Converts a rendered HTML file into a PDF at `pdf_path`.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn convert(&self, html_path: &Path, pdf_path: &Path) -> Result<(), RenderError>;
}

/// Shells out to an external HTML-to-PDF converter invoked as
/// `<program> <input.html> <output.pdf>` (weasyprint by default).
#[derive(Debug, Clone)]
pub struct CommandPdfEngine {
    program: String,
}

impl CommandPdfEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl PdfEngine for CommandPdfEngine {
    async fn convert(&self, html_path: &Path, pdf_path: &Path) -> Result<(), RenderError> {
        debug!("Running {} {} {}", self.program, html_path.display(), pdf_path.display());

        let output = Command::new(&self.program)
            .arg(html_path)
            .arg(pdf_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RenderError::Engine {
                program: self.program.clone(),
                message: format!("failed to launch: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Engine {
                program: self.program.clone(),
                message: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(())
    }
}
