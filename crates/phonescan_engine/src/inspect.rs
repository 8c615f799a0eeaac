use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::UploadFile;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
}

/// Media type declared for a video file, derived from its extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("avi") => "video/avi",
        Some("mov") => "video/mov",
        Some("mkv") => "video/mkv",
        Some("webm") => "video/webm",
        Some("mpg") | Some("mpeg") => "video/mpeg",
        _ => "application/octet-stream",
    }
}

/// Collects what the upload screen needs to know about a local file.
pub fn inspect_file(path: &Path) -> Result<UploadFile, InspectError> {
    let meta = fs::metadata(path).map_err(|source| InspectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(InspectError::NotAFile(path.to_path_buf()));
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(UploadFile {
        path: path.to_path_buf(),
        file_name,
        media_type: media_type_for_path(path).to_string(),
        size: meta.len(),
    })
}
