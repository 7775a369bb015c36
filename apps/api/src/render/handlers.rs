use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::state::AppState;

const FILE_NOT_FOUND: &str = "File not found";

/// Only bare file names inside the PDF directory may be served.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

/// GET /resume/download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if !is_plain_filename(&filename) {
        warn!("Rejected download name '{}'", filename);
        return Err(AppError::NotFound(FILE_NOT_FOUND.to_string()));
    }

    let path = state.config.pdf_dir.join(&filename);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => return Err(AppError::NotFound(FILE_NOT_FOUND.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(FILE_NOT_FOUND.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if metadata.len() == 0 {
        error!("Generated PDF {} is empty", path.display());
        return Err(AppError::EmptyFile("PDF file is empty".to_string()));
    }

    let data = tokio::fs::read(&path).await?;
    info!("Serving {} ({} bytes)", filename, data.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"resume.pdf\"",
            ),
        ],
        data,
    )
        .into_response())
}
