use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// An uploaded file owned by a single job. Dropping the guard deletes the
/// file, so cleanup happens on success, on error and while unwinding from a panic.
#[derive(Debug)]
pub struct UploadedFile {
    path: PathBuf,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed upload {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Upload {} was already gone", self.path.display())
            }
            Err(e) => warn!("Failed to remove upload {}: {e}", self.path.display()),
        }
    }
}
