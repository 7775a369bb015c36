//! Job bodies for the three queued job kinds.
//!
//! - `analyze_resume`: extract → score → persist; result `{"analysis", "task_id"}`.
//! - `generate_resume`: rewrite a stored analysis → render; result `{"pdf"}`.
//! - `generate_resume_with_keywords`: extract → rewrite → render; result `{"pdf"}`.
//!
//! Jobs that receive an uploaded file own it through [`UploadedFile`] and
//! delete it however the job ends.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::analysis::analyzer::{ResumeAnalyzer, RewriteRequest};
use crate::analysis::models::{KeywordAnalysis, StructuredResume};
use crate::extract::extract_text;
use crate::models::analysis::NewAnalysis;
use crate::queue::{Job, JobError, JobHandler};
use crate::render::PdfRenderer;
use crate::store::AnalysisStore;

mod errors;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use upload::UploadedFile;

pub struct ResumePipeline {
    analyzer: Arc<dyn ResumeAnalyzer>,
    store: Arc<dyn AnalysisStore>,
    renderer: PdfRenderer,
}

impl ResumePipeline {
    pub fn new(
        analyzer: Arc<dyn ResumeAnalyzer>,
        store: Arc<dyn AnalysisStore>,
        renderer: PdfRenderer,
    ) -> Self {
        Self {
            analyzer,
            store,
            renderer,
        }
    }

    async fn analyze_resume(
        &self,
        task_id: &str,
        resume_path: PathBuf,
        job_description: String,
    ) -> Result<Value, JobError> {
        let upload = UploadedFile::new(resume_path);
        let resume_text = extract_text(upload.path()).await?;
        info!("Extracted {} characters", resume_text.len());

        let analysis = self.analyzer.score(&resume_text, &job_description).await?;

        self.store
            .insert(NewAnalysis {
                task_id: task_id.to_string(),
                resume_text,
                job_description,
                analysis_results: Some(analysis.clone()),
            })
            .await?;

        Ok(json!({ "analysis": analysis, "task_id": task_id }))
    }

    async fn generate_resume(
        &self,
        resume_text: String,
        job_description: String,
        analysis: Option<KeywordAnalysis>,
    ) -> Result<Value, JobError> {
        let missing_keywords = analysis
            .map(|analysis| analysis.missing_keywords)
            .unwrap_or_default();

        let resume = self
            .analyzer
            .rewrite(RewriteRequest {
                resume_text: &resume_text,
                job_description: Some(&job_description),
                missing_keywords: &missing_keywords,
            })
            .await?;

        self.render(&resume).await
    }

    async fn generate_resume_with_keywords(
        &self,
        resume_path: PathBuf,
        missing_keywords: Vec<String>,
    ) -> Result<Value, JobError> {
        let upload = UploadedFile::new(resume_path);
        let resume_text = extract_text(upload.path()).await?;

        let resume = self
            .analyzer
            .rewrite(RewriteRequest {
                resume_text: &resume_text,
                job_description: None,
                missing_keywords: &missing_keywords,
            })
            .await?;

        self.render(&resume).await
    }

    async fn render(&self, resume: &StructuredResume) -> Result<Value, JobError> {
        let pdf = self.renderer.render(resume).await?;
        Ok(json!({ "pdf": pdf }))
    }
}

#[async_trait]
impl JobHandler for ResumePipeline {
    async fn handle(&self, task_id: &str, job: Job) -> Result<Value, JobError> {
        match job {
            Job::AnalyzeResume {
                resume_path,
                job_description,
            } => {
                self.analyze_resume(task_id, resume_path, job_description)
                    .await
            }
            Job::GenerateResume {
                resume_text,
                job_description,
                analysis,
            } => {
                self.generate_resume(resume_text, job_description, analysis)
                    .await
            }
            Job::GenerateResumeWithKeywords {
                resume_path,
                missing_keywords,
            } => {
                self.generate_resume_with_keywords(resume_path, missing_keywords)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{StubAnalyzer, StubPdfEngine};
    use super::*;
    use crate::extract::fixtures::{docx_bytes, pdf_bytes};
    use crate::queue::ErrorKind;
    use crate::store::MemoryAnalysisStore;
    use std::path::Path;

    struct Harness {
        dir: tempfile::TempDir,
        store: Arc<MemoryAnalysisStore>,
        pipeline: ResumePipeline,
    }

    fn harness(analyzer: StubAnalyzer) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryAnalysisStore::new());
        let renderer = PdfRenderer::new(dir.path().join("pdfs"), Arc::new(StubPdfEngine));
        let pipeline = ResumePipeline::new(Arc::new(analyzer), store.clone(), renderer);
        Harness {
            dir,
            store,
            pipeline,
        }
    }

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_analyze_scores_persists_and_removes_upload() {
        let h = harness(StubAnalyzer::new());
        let upload = write(h.dir.path(), "a.pdf", &pdf_bytes("Skills: Python, Docker"));

        let result = h
            .pipeline
            .handle(
                "task-1",
                Job::AnalyzeResume {
                    resume_path: upload.clone(),
                    job_description: "Python, Docker, Kubernetes".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(result["task_id"], "task-1");
        assert_eq!(result["analysis"]["missing_keywords"], serde_json::json!(["kubernetes"]));
        let current = result["analysis"]["current_score"].as_u64().unwrap();
        let expected = result["analysis"]["expected_score"].as_u64().unwrap();
        assert!(expected > current);

        let record = h.store.get("task-1").await.unwrap().unwrap();
        assert_eq!(record.job_description, "Python, Docker, Kubernetes");
        assert!(record.resume_text.contains("Docker"));
        assert_eq!(
            record.analysis_results.unwrap().missing_keywords,
            vec!["kubernetes"]
        );
        assert!(!upload.exists());
    }

    #[tokio::test]
    async fn test_unsupported_upload_fails_and_is_removed() {
        let h = harness(StubAnalyzer::new());
        let upload = write(h.dir.path(), "notes.txt", b"plain text");

        let err = h
            .pipeline
            .handle(
                "task-1",
                Job::AnalyzeResume {
                    resume_path: upload.clone(),
                    job_description: "Rust".into(),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnsupportedFormat);
        assert!(!upload.exists());
    }

    #[tokio::test]
    async fn test_missing_upload_is_file_not_found() {
        let h = harness(StubAnalyzer::new());
        let err = h
            .pipeline
            .handle(
                "task-1",
                Job::AnalyzeResume {
                    resume_path: h.dir.path().join("gone.pdf"),
                    job_description: "Rust".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileNotFound);
    }

    #[tokio::test]
    async fn test_llm_failure_is_external_and_upload_removed() {
        let h = harness(StubAnalyzer::failing());
        let upload = write(h.dir.path(), "a.docx", &docx_bytes(&["Jane Doe", "Rust"]));

        let err = h
            .pipeline
            .handle(
                "task-1",
                Job::AnalyzeResume {
                    resume_path: upload.clone(),
                    job_description: "Rust".into(),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::ExternalServiceError);
        assert!(h.store.get("task-1").await.unwrap().is_none());
        assert!(!upload.exists());
    }

    #[tokio::test]
    async fn test_generate_resume_renders_pdf() {
        let h = harness(StubAnalyzer::new());
        let result = h
            .pipeline
            .handle(
                "task-2",
                Job::GenerateResume {
                    resume_text: "Python, Docker".into(),
                    job_description: "Python, Docker, Kubernetes".into(),
                    analysis: Some(KeywordAnalysis {
                        current_score: 66,
                        expected_score: 90,
                        missing_keywords: vec!["kubernetes".into()],
                    }),
                },
            )
            .await
            .unwrap();

        let filename = result["pdf"]["filename"].as_str().unwrap();
        assert!(filename.starts_with("resume_") && filename.ends_with(".pdf"));
        assert_eq!(
            result["pdf"]["download_url"],
            format!("/resume/download/{filename}")
        );
        let pdf_path = result["pdf"]["pdf_path"].as_str().unwrap();
        assert!(std::fs::metadata(pdf_path).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_generate_with_keywords_removes_upload() {
        let h = harness(StubAnalyzer::new());
        let upload = write(h.dir.path(), "a.docx", &docx_bytes(&["Jane Doe", "Go"]));

        let result = h
            .pipeline
            .handle(
                "task-3",
                Job::GenerateResumeWithKeywords {
                    resume_path: upload.clone(),
                    missing_keywords: vec!["helm".into()],
                },
            )
            .await
            .unwrap();

        assert!(result["pdf"]["filename"].is_string());
        assert!(!upload.exists());
    }

    #[tokio::test]
    async fn test_second_analysis_for_same_task_is_rejected() {
        let h = harness(StubAnalyzer::new());
        for attempt in 0..2 {
            let upload = write(h.dir.path(), "a.pdf", &pdf_bytes("Python"));
            let outcome = h
                .pipeline
                .handle(
                    "task-1",
                    Job::AnalyzeResume {
                        resume_path: upload,
                        job_description: "Python".into(),
                    },
                )
                .await;
            if attempt == 0 {
                assert!(outcome.is_ok());
            } else {
                assert_eq!(outcome.unwrap_err().kind, ErrorKind::PersistenceError);
            }
        }
    }
}
