use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::shared::constants::STAGED_IMAGE_PREFIX;
use crate::shared::error::FaceDetectionError;

/// Image bytes materialized as a uniquely named file in a scratch directory.
///
/// The file is deleted when the handle is dropped, so every exit path of
/// the request releases it exactly once.
#[derive(Debug)]
pub struct StagedImage {
    file: NamedTempFile,
}

impl StagedImage {
    pub fn stage(bytes: &[u8], scratch_dir: &Path) -> Result<Self, FaceDetectionError> {
        let staging_err = |source| FaceDetectionError::Staging {
            dir: scratch_dir.to_path_buf(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(STAGED_IMAGE_PREFIX)
            .tempfile_in(scratch_dir)
            .map_err(staging_err)?;
        file.write_all(bytes).map_err(staging_err)?;
        file.flush().map_err(staging_err)?;

        log::debug!("Staged {} bytes at {}", bytes.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Deletes the file now instead of at drop, surfacing any I/O error.
    pub fn release(self) -> std::io::Result<PathBuf> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        Ok(path)
    }
}
