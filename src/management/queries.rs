use std::{io::ErrorKind, path::Path};

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::{error::InputError, warning};

/// Reads the query file: one query per line, blank lines dropped, order kept.
///
/// # Errors
///
/// - [`InputError::NotFound`] if `path` does not exist
/// - [`InputError::Empty`] if no non-blank line remains
/// - [`InputError::Unreadable`] for any other IO failure
pub async fn load(path: &Path) -> Result<Vec<String>, InputError> {
    let bytes = match async_fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(InputError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(InputError::Unreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let content = decode(&bytes, path);

    let queries = parse(&content);
    if queries.is_empty() {
        return Err(InputError::Empty(path.to_path_buf()));
    }

    tracing::debug!("loaded {} queries from {}", queries.len(), path.display());
    Ok(queries)
}

/// Decodes the raw file, guessing the encoding when it is not UTF-8
/// (typically Windows-1252 from older editors).
fn decode(bytes: &[u8], path: &Path) -> String {
    if let Ok(content) = std::str::from_utf8(bytes) {
        return content.to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding: &'static Encoding = detector.guess(None, true);

    let (content, used, had_errors) = encoding.decode(bytes);
    warning!(
        "{} is not valid UTF-8; reading it as {}.",
        path.display(),
        used.name()
    );
    if had_errors {
        warning!(
            "Some bytes in {} could not be decoded and were replaced.",
            path.display()
        );
    }
    content.into_owned()
}

/// Splits file content into trimmed, non-empty queries.
pub fn parse(content: &str) -> Vec<String> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
