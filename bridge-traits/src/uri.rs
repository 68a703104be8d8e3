//! Helpers for the two URI schemes the pipeline handles: repository content
//! URIs (`content://…/<id>`) and file URIs or plain paths.

use std::path::PathBuf;

const FILE_SCHEME: &str = "file://";

/// Parse the trailing numeric segment of a content URI.
///
/// Returns `None` when the last path segment is not an integer.
pub fn parse_content_id(uri: &str) -> Option<i64> {
    let trimmed = uri.split(['?', '#']).next().unwrap_or(uri);
    trimmed.rsplit('/').next()?.parse().ok()
}

/// Resolve a `file://` URI or an absolute path to a filesystem path.
///
/// Percent-encoded characters in file URIs are decoded. Other schemes yield
/// `None`.
pub fn to_file_path(uri: &str) -> Option<PathBuf> {
    if let Some(rest) = uri.strip_prefix(FILE_SCHEME) {
        let decoded = urlencoding::decode(rest).ok()?;
        return Some(PathBuf::from(decoded.into_owned()));
    }
    if uri.starts_with('/') {
        return Some(PathBuf::from(uri));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_id() {
        assert_eq!(
            parse_content_id("content://media/external/images/media/42"),
            Some(42)
        );
        assert_eq!(
            parse_content_id("content://media/external/video/media/7?x=1"),
            Some(7)
        );
        assert_eq!(parse_content_id("content://media/external/images/media"), None);
        assert_eq!(parse_content_id("file:///sdcard/a.jpg"), None);
    }

    #[test]
    fn test_to_file_path() {
        assert_eq!(
            to_file_path("file:///sdcard/My%20Photos/a.jpg"),
            Some(PathBuf::from("/sdcard/My Photos/a.jpg"))
        );
        assert_eq!(to_file_path("/tmp/b.png"), Some(PathBuf::from("/tmp/b.png")));
        assert_eq!(to_file_path("content://media/external/images/media/1"), None);
    }
}
