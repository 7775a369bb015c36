use std::path::{Path, PathBuf};

use axum::{
    extract::{Multipart, Path as UrlPath, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::models::parse_missing_keywords;
use crate::errors::AppError;
use crate::pipeline::UploadedFile;
use crate::queue::Job;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

/// Returned by every endpoint that queues a job.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub task_id: String,
    pub status_url: String,
    pub message: &'static str,
}

impl SubmitResponse {
    fn queued(task_id: String, message: &'static str) -> Self {
        Self {
            status_url: format!("/task-status/{task_id}"),
            task_id,
            message,
        }
    }
}

/// A resume file plus one accompanying text field.
struct ResumeForm {
    file_name: String,
    data: Bytes,
    text: String,
}

async fn read_resume_form(
    mut multipart: Multipart,
    text_field: &str,
) -> Result<ResumeForm, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut text: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == RESUME_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            resume = Some((file_name, field.bytes().await?));
        } else if name == text_field {
            text = Some(field.text().await?);
        }
    }

    let (file_name, data) = resume
        .ok_or_else(|| AppError::Validation(format!("Missing '{RESUME_FIELD}' file")))?;
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded resume is empty".to_string()));
    }
    let text = text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("Missing '{text_field}'")))?;

    Ok(ResumeForm {
        file_name,
        data,
        text,
    })
}

/// Writes the upload as `<uuid-hex><lower-cased extension>` under `dir`.
async fn save_upload(dir: &Path, file_name: &str, data: &[u8]) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir).await?;
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    let path = dir.join(format!("{}{extension}", Uuid::new_v4().simple()));
    tokio::fs::write(&path, data).await?;
    info!("Saved upload '{}' to {}", file_name, path.display());
    Ok(path)
}

/// Queues a job that owns `upload`; the file is removed if queuing fails.
async fn submit_with_upload(
    state: &AppState,
    upload: PathBuf,
    job: Job,
    message: &'static str,
) -> Result<Json<SubmitResponse>, AppError> {
    match state.queue.submit(job).await {
        Ok(task_id) => Ok(Json(SubmitResponse::queued(task_id, message))),
        Err(e) => {
            warn!("Could not queue job for {}; discarding upload", upload.display());
            drop(UploadedFile::new(upload));
            Err(e.into())
        }
    }
}

/// POST /upload
/// Multipart `resume` + `job_description`; queues extraction and scoring.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let form = read_resume_form(multipart, "job_description").await?;
    let path = save_upload(&state.config.upload_dir, &form.file_name, &form.data).await?;

    let job = Job::AnalyzeResume {
        resume_path: path.clone(),
        job_description: form.text,
    };
    submit_with_upload(&state, path, job, "Analysis task queued successfully").await
}

/// POST /generate-resume-with-keyword
/// Multipart `resume` + `missing_keywords`; queues extraction, rewrite and rendering.
pub async fn handle_generate_with_keywords(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let form = read_resume_form(multipart, "missing_keywords").await?;
    let missing_keywords = parse_missing_keywords(&form.text);
    let path = save_upload(&state.config.upload_dir, &form.file_name, &form.data).await?;

    let job = Job::GenerateResumeWithKeywords {
        resume_path: path.clone(),
        missing_keywords,
    };
    submit_with_upload(&state, path, job, "Resume generation task queued successfully").await
}

/// POST /generate-resume/:task_id
/// Queues a rewrite seeded from the analysis stored under `task_id`.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    UrlPath(task_id): UrlPath<String>,
) -> Result<Json<SubmitResponse>, AppError> {
    let record = state.store.get(&task_id).await?.ok_or_else(|| {
        AppError::NotFound("Analysis data not found. Please run analysis first.".to_string())
    })?;

    let job = Job::GenerateResume {
        resume_text: record.resume_text,
        job_description: record.job_description,
        analysis: record.analysis_results,
    };
    let new_task_id = state.queue.submit(job).await?;
    info!("Resume generation for analysis {} queued as {}", task_id, new_task_id);

    Ok(Json(SubmitResponse::queued(
        new_task_id,
        "Resume generation task queued successfully",
    )))
}
