use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory {path:?} unusable: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes `{dir}/{filename}` through a temp file and rename, so readers never
/// see a half-written image or state file. The directory is created on the
/// first write.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        fs::create_dir_all(&self.dir).map_err(|err| self.dir_error(err))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|err| self.dir_error(err))?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        let target = self.dir.join(filename);
        tmp.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }

    fn dir_error(&self, err: io::Error) -> PersistError {
        PersistError::OutputDir {
            path: self.dir.clone(),
            message: err.to_string(),
        }
    }
}
