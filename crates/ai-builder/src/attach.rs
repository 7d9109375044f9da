//! Loading local files into attachments.

use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use ai_builder_model::Attachment;
use tokio::task::{JoinError, spawn_blocking};

/// Error returned by [`collect`].
#[derive(Debug)]
pub enum AttachError {
    /// The glob pattern is malformed.
    Pattern(glob::PatternError),
    /// A matched file could not be read.
    Read(PathBuf, io::Error),
    /// The pattern matched no regular file.
    NoMatch(String),
    /// The directory walk was aborted.
    Walk(JoinError),
}

impl Display for AttachError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AttachError::Pattern(err) => write!(f, "invalid pattern: {err}"),
            AttachError::Read(path, err) => {
                write!(f, "failed to read {}: {err}", path.display())
            }
            AttachError::NoMatch(pattern) => {
                write!(f, "no file matches {pattern:?}")
            }
            AttachError::Walk(err) => write!(f, "failed to list files: {err}"),
        }
    }
}

impl std::error::Error for AttachError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttachError::Pattern(err) => Some(err),
            AttachError::Read(_, err) => Some(err),
            AttachError::NoMatch(_) => None,
            AttachError::Walk(err) => Some(err),
        }
    }
}

/// Expands `pattern` and reads every matched file into an attachment named
/// after the file.
///
/// Directories and unreadable entries produced by the expansion are
/// skipped; a file that matches but cannot be read fails the whole batch.
pub async fn collect(pattern: &str) -> Result<Vec<Attachment>, AttachError> {
    let paths = glob::glob(pattern).map_err(AttachError::Pattern)?;
    let paths = walk(move || {
        paths.flatten().filter(|p| p.is_file()).collect()
    })
    .await?;
    if paths.is_empty() {
        return Err(AttachError::NoMatch(pattern.to_owned()));
    }

    let mut attachments = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(&path)
            .await
            .map_err(|err| AttachError::Read(path.clone(), err))?;
        trace!("read {} byte(s) from {}", data.len(), path.display());
        attachments.push(Attachment::new(file_name(&path), data));
    }
    Ok(attachments)
}

async fn walk<F>(f: F) -> Result<Vec<PathBuf>, AttachError>
where
    F: FnOnce() -> Vec<PathBuf> + Send + 'static,
{
    spawn_blocking(f).await.map_err(AttachError::Walk)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
