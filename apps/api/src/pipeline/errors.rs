//! Conversions from component failures into the job-level error taxonomy.

use crate::analysis::analyzer::AnalyzerError;
use crate::extract::ExtractError;
use crate::queue::{ErrorKind, JobError};
use crate::render::RenderError;
use crate::store::StoreError;

impl From<ExtractError> for JobError {
    fn from(err: ExtractError) -> Self {
        let kind = match &err {
            ExtractError::NotFound(_) => ErrorKind::FileNotFound,
            ExtractError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ExtractError::Extraction { .. } => ErrorKind::ExtractionError,
        };
        JobError::new(kind, err.to_string())
    }
}

impl From<AnalyzerError> for JobError {
    fn from(err: AnalyzerError) -> Self {
        JobError::new(ErrorKind::ExternalServiceError, err.to_string())
    }
}

impl From<RenderError> for JobError {
    fn from(err: RenderError) -> Self {
        JobError::new(ErrorKind::RenderError, err.to_string())
    }
}

impl From<StoreError> for JobError {
    fn from(err: StoreError) -> Self {
        JobError::new(ErrorKind::PersistenceError, err.to_string())
    }
}
