use std::fmt;

use crate::SelectedFile;

/// Media types the backend accepts.
pub const ALLOWED_MEDIA_TYPES: [&str; 4] = ["video/mp4", "video/avi", "video/mov", "video/mkv"];

/// Upload ceiling: 100 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoFile,
    UnsupportedType { media_type: String },
    TooLarge { size: u64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoFile => write!(f, "Please select a video file"),
            ValidationError::UnsupportedType { .. } => {
                write!(f, "Please select a valid video file (MP4, AVI, MOV, MKV)")
            }
            ValidationError::TooLarge { .. } => write!(f, "File size must be less than 100MB"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Local checks run before any network call.
pub fn validate_file(file: Option<&SelectedFile>) -> Result<&SelectedFile, ValidationError> {
    let file = file.ok_or(ValidationError::NoFile)?;
    if !ALLOWED_MEDIA_TYPES.contains(&file.media_type.as_str()) {
        return Err(ValidationError::UnsupportedType {
            media_type: file.media_type.clone(),
        });
    }
    if file.size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge { size: file.size });
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(media_type: &str, size: u64) -> SelectedFile {
        SelectedFile {
            path: "clip".into(),
            name: "clip".to_string(),
            media_type: media_type.to_string(),
            size,
        }
    }

    #[test]
    fn accepts_exactly_the_ceiling() {
        let f = file("video/mkv", MAX_UPLOAD_BYTES);
        assert!(validate_file(Some(&f)).is_ok());
    }

    #[test]
    fn type_is_checked_before_size() {
        let f = file("image/png", MAX_UPLOAD_BYTES + 1);
        assert!(matches!(
            validate_file(Some(&f)),
            Err(ValidationError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert_eq!(validate_file(None), Err(ValidationError::NoFile));
    }
}
