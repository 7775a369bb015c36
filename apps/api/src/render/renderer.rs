use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use askama::Template;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};
use uuid::Uuid;

use super::engine::PdfEngine;
use super::presentation::ResumeView;
use super::RenderError;
use crate::analysis::models::StructuredResume;

#[derive(Template)]
#[template(path = "resume.html")]
struct ResumeTemplate<'a> {
    resume: &'a ResumeView,
}

/// Renders the resume HTML document for a presentation view.
pub fn render_html(view: &ResumeView) -> Result<String, RenderError> {
    Ok(ResumeTemplate { resume: view }.render()?)
}

/// Location of a freshly rendered PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPdf {
    pub filename: String,
    pub pdf_path: String,
    pub download_url: String,
}

/// Turns structured resumes into PDF files under `output_dir`.
#[derive(Clone)]
pub struct PdfRenderer {
    output_dir: PathBuf,
    engine: Arc<dyn PdfEngine>,
}

impl PdfRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, engine: Arc<dyn PdfEngine>) -> Self {
        Self {
            output_dir: output_dir.into(),
            engine,
        }
    }

    pub async fn render(&self, resume: &StructuredResume) -> Result<GeneratedPdf, RenderError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let html = render_html(&ResumeView::from(resume))?;
        let filename = format!("resume_{}.pdf", Uuid::new_v4().simple());
        let pdf_path = self.output_dir.join(&filename);

        let html_file = write_temp_html(&self.output_dir, &html)?;
        let converted = self.engine.convert(html_file.path(), &pdf_path).await;
        discard_temp_html(html_file);

        let outcome = match converted {
            Ok(()) => verify_output(&pdf_path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            remove_bad_output(&pdf_path).await;
            return Err(e);
        }

        info!("Rendered {}", pdf_path.display());
        Ok(GeneratedPdf {
            download_url: format!("/resume/download/{filename}"),
            pdf_path: pdf_path.display().to_string(),
            filename,
        })
    }
}

fn write_temp_html(dir: &Path, html: &str) -> Result<NamedTempFile, RenderError> {
    let mut file = tempfile::Builder::new()
        .prefix("temp_")
        .suffix(".html")
        .tempfile_in(dir)?;
    file.write_all(html.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn discard_temp_html(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        warn!("Failed to remove temporary HTML {}: {e}", path.display());
    }
}

async fn verify_output(pdf_path: &Path) -> Result<(), RenderError> {
    match tokio::fs::metadata(pdf_path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(RenderError::EmptyOutput(pdf_path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RenderError::MissingOutput(pdf_path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

async fn remove_bad_output(pdf_path: &Path) {
    match tokio::fs::remove_file(pdf_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove unusable PDF {}: {e}", pdf_path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::{PersonalInformation, Project, WorkExperience};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Writes fixed bytes in place of a real converter and keeps the HTML it saw.
    struct StubEngine {
        output: &'static [u8],
        seen_html: Mutex<Option<(PathBuf, String)>>,
    }

    impl StubEngine {
        fn writing(output: &'static [u8]) -> Arc<Self> {
            Arc::new(Self {
                output,
                seen_html: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl PdfEngine for StubEngine {
        async fn convert(&self, html_path: &Path, pdf_path: &Path) -> Result<(), RenderError> {
            let html = tokio::fs::read_to_string(html_path).await?;
            *self.seen_html.lock().unwrap() = Some((html_path.to_path_buf(), html));
            tokio::fs::write(pdf_path, self.output).await?;
            Ok(())
        }
    }

    fn resume(name: &str) -> StructuredResume {
        StructuredResume {
            most_match_role: "Platform Engineer".into(),
            personal_information: PersonalInformation {
                name: name.into(),
                ..Default::default()
            },
            skills: vec!["Kubernetes".into(), "Rust".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_html_has_a4_page_rule() {
        let html = render_html(&ResumeView::from(&resume("Ada"))).unwrap();
        assert!(html.contains("@page { size: A4; margin: 5mm; }"));
        assert!(html.contains("Platform Engineer"));
        assert!(html.contains("Kubernetes"));
    }

    #[test]
    fn test_html_renders_descriptions_line_by_line() {
        let structured = StructuredResume {
            work_experience: vec![WorkExperience {
                company: "Acme".into(),
                title: "Engineer".into(),
                descriptions: vec!["Shipped Kubernetes".into(), "Cut costs".into()],
                ..Default::default()
            }],
            projects: vec![Project {
                title: "resumatch".into(),
                description: vec!["Built it".into(), "Ran it".into()],
                technologies: vec![],
            }],
            ..resume("Ada")
        };

        let html = render_html(&ResumeView::from(&structured)).unwrap();
        assert!(html.contains(".description { margin: 2px 0 0 0; white-space: pre-line; }"));
        assert!(html.contains(r#"<div class="description">Shipped Kubernetes
Cut costs</div>"#));
        assert!(html.contains(r#"<div class="description">Built it
Ran it</div>"#));
    }

    #[test]
    fn test_html_escapes_model_output() {
        let html = render_html(&ResumeView::from(&resume("<script>x</script>"))).unwrap();
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_render_writes_named_pdf_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let engine = StubEngine::writing(b"%PDF-1.4 stub");
        let renderer = PdfRenderer::new(dir.path().join("pdfs"), engine.clone());

        let pdf = renderer.render(&resume("Ada Lovelace")).await.unwrap();

        let hex = pdf
            .filename
            .strip_prefix("resume_")
            .and_then(|rest| rest.strip_suffix(".pdf"))
            .unwrap();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(pdf.download_url, format!("/resume/download/{}", pdf.filename));
        assert!(Path::new(&pdf.pdf_path).exists());

        let (html_path, html) = engine.seen_html.lock().unwrap().clone().unwrap();
        assert!(html.contains("Ada Lovelace"));
        let html_name = html_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(html_name.starts_with("temp_") && html_name.ends_with(".html"));
        assert!(!html_path.exists(), "temporary HTML should be removed");
    }

    #[tokio::test]
    async fn test_empty_output_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path(), StubEngine::writing(b""));

        let err = renderer.render(&resume("Ada")).await.unwrap_err();
        let RenderError::EmptyOutput(path) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_output_is_rejected() {
        struct NoopEngine;

        #[async_trait]
        impl PdfEngine for NoopEngine {
            async fn convert(&self, _: &Path, _: &Path) -> Result<(), RenderError> {
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path(), Arc::new(NoopEngine));
        let err = renderer.render(&resume("Ada")).await.unwrap_err();
        assert!(matches!(err, RenderError::MissingOutput(_)), "{err:?}");
    }
}
