//! Network-free stand-ins for the analyzer and PDF engine.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;

use crate::analysis::analyzer::{AnalyzerError, ResumeAnalyzer, RewriteRequest};
use crate::analysis::models::{
    KeywordAnalysis, PersonalInformation, StructuredResume, WorkExperience,
};
use crate::llm_client::LlmError;
use crate::render::{PdfEngine, RenderError};

/// Scores by literal keyword overlap and rewrites into a fixed resume.
pub struct StubAnalyzer {
    fail: bool,
}

impl StubAnalyzer {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// Every call fails as if the model endpoint were down.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

fn keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect()
}

#[async_trait]
impl ResumeAnalyzer for StubAnalyzer {
    async fn score(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<KeywordAnalysis, AnalyzerError> {
        if self.fail {
            return Err(LlmError::EmptyContent.into());
        }
        let have: HashSet<String> = keywords(resume_text).into_iter().collect();
        let wanted = keywords(job_description);
        let missing: Vec<String> = wanted
            .iter()
            .filter(|k| !have.contains(*k))
            .cloned()
            .collect();

        let matched = (wanted.len() - missing.len()) as u32;
        let current = if wanted.is_empty() {
            100
        } else {
            matched * 100 / wanted.len() as u32
        };
        let (current, expected, missing) = if missing.is_empty() {
            (current, current, missing)
        } else {
            let current = current.min(84);
            (current, (current + 10 * missing.len() as u32).min(100), missing)
        };

        Ok(KeywordAnalysis {
            current_score: current,
            expected_score: expected,
            missing_keywords: missing,
        }
        .validate()?)
    }

    async fn rewrite(&self, request: RewriteRequest<'_>) -> Result<StructuredResume, AnalyzerError> {
        if self.fail {
            return Err(LlmError::EmptyContent.into());
        }
        let mut skills = keywords(request.resume_text);
        skills.extend(request.missing_keywords.iter().cloned());

        Ok(StructuredResume {
            most_match_role: "Software Engineer".into(),
            personal_information: PersonalInformation {
                name: "Test Candidate".into(),
                email: "candidate@example.com".into(),
                ..Default::default()
            },
            professional_summary: "Engineer.".into(),
            skills,
            work_experience: vec![WorkExperience {
                company: "Acme".into(),
                title: "Engineer".into(),
                descriptions: (1..=5).map(|i| format!("Delivered project {i}")).collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
        .validate()?)
    }
}

/// Writes a small fixed PDF-looking file.
pub struct StubPdfEngine;

#[async_trait]
impl PdfEngine for StubPdfEngine {
    async fn convert(&self, _html_path: &Path, pdf_path: &Path) -> Result<(), RenderError> {
        tokio::fs::write(pdf_path, b"%PDF-1.4\n% stub\n").await?;
        Ok(())
    }
}
