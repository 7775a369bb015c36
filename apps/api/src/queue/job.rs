use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::models::KeywordAnalysis;
use crate::pipeline::UploadedFile;

/// A unit of work and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    /// Extract, score against the job description, persist the analysis.
    AnalyzeResume {
        resume_path: PathBuf,
        job_description: String,
    },
    /// Rewrite and render from a stored analysis.
    GenerateResume {
        resume_text: String,
        job_description: String,
        analysis: Option<KeywordAnalysis>,
    },
    /// Extract, rewrite around the given keywords, render.
    GenerateResumeWithKeywords {
        resume_path: PathBuf,
        missing_keywords: Vec<String>,
    },
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::AnalyzeResume { .. } => JobKind::AnalyzeResume,
            Job::GenerateResume { .. } => JobKind::GenerateResume,
            Job::GenerateResumeWithKeywords { .. } => JobKind::GenerateResumeWithKeywords,
        }
    }

    /// The uploaded file this job takes ownership of, if any.
    pub fn upload_path(&self) -> Option<&Path> {
        match self {
            Job::AnalyzeResume { resume_path, .. }
            | Job::GenerateResumeWithKeywords { resume_path, .. } => Some(resume_path),
            Job::GenerateResume { .. } => None,
        }
    }

    /// Deletes the upload of a job that will never run.
    pub fn discard_upload(&self) {
        if let Some(path) = self.upload_path() {
            drop(UploadedFile::new(path));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    AnalyzeResume,
    GenerateResume,
    GenerateResumeWithKeywords,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::AnalyzeResume => "analyze_resume",
            JobKind::GenerateResume => "generate_resume",
            JobKind::GenerateResumeWithKeywords => "generate_resume_with_keywords",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What travels through the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub task_id: String,
    pub job: Job,
}
