//! Resume Analyzer: scores a resume against a job description and rewrites
//! it into the structured schema.
//!
//! `LlmResumeAnalyzer` is the production backend. Callers hold an
//! `Arc<dyn ResumeAnalyzer>` so job bodies can be exercised without the network.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::analysis::models::{KeywordAnalysis, SchemaViolation, StructuredResume};
use crate::analysis::prompts::{
    resume_message, structured_resume_schema, KEYWORD_REWRITE_SYSTEM, KEYWORD_SCORE_SYSTEM,
    TARGETED_REWRITE_SYSTEM,
};
use crate::llm_client::prompts::json_only;
use crate::llm_client::{LlmClient, LlmError, ResponseFormat};

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("language model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("language model returned a non-conforming response: {0}")]
    Schema(#[from] SchemaViolation),
}

/// Input for a resume rewrite.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRequest<'a> {
    pub resume_text: &'a str,
    /// `None` for keyword-only rewrites.
    pub job_description: Option<&'a str>,
    pub missing_keywords: &'a [String],
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    /// Scores `resume_text` against `job_description`.
    async fn score(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<KeywordAnalysis, AnalyzerError>;

    /// Rewrites the resume into the structured schema, enriched with the missing keywords.
    async fn rewrite(&self, request: RewriteRequest<'_>) -> Result<StructuredResume, AnalyzerError>;
}

/// Analyzer backed by the hosted chat-completion model.
pub struct LlmResumeAnalyzer {
    llm: LlmClient,
}

impl LlmResumeAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn score(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<KeywordAnalysis, AnalyzerError> {
        let prompt = resume_message(resume_text, Some(job_description));
        let analysis: KeywordAnalysis = self
            .llm
            .call_json(
                &prompt,
                &json_only(KEYWORD_SCORE_SYSTEM),
                &ResponseFormat::JsonObject,
            )
            .await?;
        let analysis = analysis.validate()?;

        info!(
            "Keyword analysis: current={} expected={} missing={}",
            analysis.current_score,
            analysis.expected_score,
            analysis.missing_keywords.len()
        );
        Ok(analysis)
    }

    async fn rewrite(&self, request: RewriteRequest<'_>) -> Result<StructuredResume, AnalyzerError> {
        let system = rewrite_system_prompt(request);
        let prompt = resume_message(request.resume_text, request.job_description);
        let format = ResponseFormat::JsonSchema {
            name: "ResumeData",
            schema: structured_resume_schema(),
        };

        let resume: StructuredResume = self.llm.call_json(&prompt, &system, &format).await?;
        let resume = resume.validate()?;

        info!(
            "Structured resume: role='{}' experience_entries={}",
            resume.most_match_role,
            resume.work_experience.len()
        );
        Ok(resume)
    }
}

fn rewrite_system_prompt(request: RewriteRequest<'_>) -> String {
    let template = match request.job_description {
        Some(_) => TARGETED_REWRITE_SYSTEM,
        None => KEYWORD_REWRITE_SYSTEM,
    };
    let keywords = if request.missing_keywords.is_empty() {
        "(none)".to_string()
    } else {
        request.missing_keywords.join(", ")
    };
    template.replace("{missing_keywords}", &keywords)
}
