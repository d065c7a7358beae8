use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Longest stored filename, in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilenameError {
    #[error("Filename is empty after sanitization")]
    Empty,
}

/// Reduces a client-supplied filename to a safe, flat, ASCII name.
///
/// The name is NFKD-normalized so accented letters keep their base letter and
/// remaining non-ASCII characters are dropped. Path separators and runs of
/// whitespace become a single `_`, anything outside `[A-Za-z0-9._-]` is
/// removed and leading/trailing `.` and `_` are stripped. The result never contains a
/// path separator and never starts with a dot.
pub fn sanitize_filename(filename: &str) -> Result<String, FilenameError> {
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_ascii_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let mut sanitized = kept.trim_matches(|c| c == '.' || c == '_');
    if sanitized.len() > MAX_FILENAME_LEN {
        // ASCII only, any index is a char boundary
        sanitized = sanitized[..MAX_FILENAME_LEN].trim_end_matches(|c| c == '.' || c == '_');
    }

    if sanitized.is_empty() {
        if !filename.is_empty() {
            tracing::warn!("Rejected filename with no usable characters: {:?}", filename);
        }
        return Err(FilenameError::Empty);
    }

    Ok(sanitized.to_string())
}
