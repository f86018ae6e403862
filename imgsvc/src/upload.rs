//! Uploaded files and the names they are stored under.

use bytes::Bytes;
use rand::prelude::RngExt;
use rand::rng;

/// Length of the random prefix of a stored object name
pub const NAME_KEY_LENGTH: usize = 5;

/// Upper bound on the sanitized part of a stored name, so names fit the `images.path` column
pub const MAX_SANITIZED_LENGTH: usize = 120;

const NAME_KEY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A file received from a client, fully buffered.
///
/// `Bytes` clones share the underlying buffer, so every consumer (the storage writer and
/// each analysis task) gets its own view without copying or coordinating a read cursor.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content: Bytes,
    /// Filename declared by the client
    pub filename: String,
    /// Media type declared by the client, e.g. `image/png`
    pub content_type: Option<String>,
}

impl UploadedFile {
    pub fn new(content: impl Into<Bytes>, filename: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            content: content.into(),
            filename: filename.into(),
            content_type,
        }
    }
}

/// Generate a collision-resistant, filesystem and URL safe name for an upload.
///
/// Format: `<5 random alphanumerics>_<sanitized filename>`, e.g. `aZ3k9_holiday_photo.png`.
pub fn generate_unique_name(filename: &str) -> String {
    let mut rng = rng();
    let key: String = (0..NAME_KEY_LENGTH)
        .map(|_| char::from(NAME_KEY_CHARSET[rng.random_range(0..NAME_KEY_CHARSET.len())]))
        .collect();

    format!("{}_{}", key, secure_filename(filename))
}

/// Reduce a client-supplied filename to `[A-Za-z0-9._-]`.
///
/// Directory components are dropped, whitespace becomes `_`, other characters are removed,
/// and leading/trailing dots and underscores are trimmed. Falls back to `upload` when nothing
/// usable remains.
pub fn secure_filename(filename: &str) -> String {
    // Only the last path component is meaningful; clients sometimes send full paths
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return "upload".to_string();
    }

    truncate_keeping_extension(trimmed, MAX_SANITIZED_LENGTH)
}

fn truncate_keeping_extension(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }

    // Sanitized names are pure ASCII, so byte slicing is safe
    match name.rfind('.') {
        Some(dot) if name.len() - dot < max_len / 2 => {
            let extension = &name[dot..];
            format!("{}{}", &name[..max_len - extension.len()], extension)
        }
        _ => name[..max_len].to_string(),
    }
}
