use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ComparisonResult;

/// Written in place of the score when either file of a pair could not be read.
pub const ERROR_MARKER: &str = "ERROR";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot open comparison log {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Truncate (or create) the log so a new run starts from an empty file.
pub fn reset_log(path: &Path) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    }
    File::create(path).map_err(|source| PersistError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Append-only `fileA,fileB,score` log.
///
/// Each row goes out in a single `write_all` on a file opened in append mode,
/// and callers serialize access, so rows never interleave.
#[derive(Debug)]
pub struct ComparisonLog {
    path: PathBuf,
    file: File,
}

impl ComparisonLog {
    pub fn open(path: &Path) -> Result<Self, PersistError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| PersistError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_result(&mut self, result: &ComparisonResult) -> Result<(), PersistError> {
        let line = format!(
            "{},{},{}\n",
            result.file_a.display(),
            result.file_b.display(),
            result.similarity
        );
        self.append_line(&line)
    }

    pub fn append_failure(&mut self, file_a: &Path, file_b: &Path) -> Result<(), PersistError> {
        let line = format!("{},{},{}\n", file_a.display(), file_b.display(), ERROR_MARKER);
        self.append_line(&line)
    }

    fn append_line(&mut self, line: &str) -> Result<(), PersistError> {
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}
