//! Upload validation, run before anything is written.

use crate::upload::UploadedFile;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// No file part was sent, or it has no filename
    #[error("No file was uploaded")]
    MissingFile,

    /// The declared media type is absent or its subtype is not allowed
    #[error("File type not allowed")]
    DisallowedType,
}

impl ValidationError {
    /// Machine-readable code returned to clients
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFile => "missing_file",
            ValidationError::DisallowedType => "disallowed_type",
        }
    }
}

/// Checks uploads against an allow-list of media subtypes
#[derive(Debug, Clone, Default)]
pub struct UploadValidator {
    allowed: Vec<String>,
}

impl UploadValidator {
    /// `allowed` holds subtypes such as `png` or `jpeg`; matching is case-insensitive.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|ext| ext.as_ref().trim().to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn validate(&self, file: Option<&UploadedFile>) -> Result<(), ValidationError> {
        let file = file.ok_or(ValidationError::MissingFile)?;
        if file.filename.is_empty() {
            return Err(ValidationError::MissingFile);
        }

        let subtype = file
            .content_type
            .as_deref()
            .and_then(media_subtype)
            .ok_or(ValidationError::DisallowedType)?;

        if self.allowed.iter().any(|ext| *ext == subtype) {
            Ok(())
        } else {
            Err(ValidationError::DisallowedType)
        }
    }
}

/// `image/PNG; charset=binary` -> `png`
fn media_subtype(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    let (_, subtype) = essence.split_once('/')?;
    let subtype = subtype.trim();
    (!subtype.is_empty()).then(|| subtype.to_ascii_lowercase())
}
