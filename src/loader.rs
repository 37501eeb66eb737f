//! External content loading for chunks that reference a file instead of inline data

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{ChunkError, Result};

/// Whether a chunk body carries anything besides blank lines
pub fn has_content(body: &[String]) -> bool {
    body.iter().any(|line| !line.trim().is_empty())
}

/// Read a text file as chunk body lines
pub fn read_lines(chunk: &str, path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| ChunkError::ExternalFileUnreadable {
        chunk: chunk.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Replace an inline body with the content of `path`
///
/// Inline content is discarded; a warning is emitted when there was any.
pub fn substitute_body(chunk: &str, inline: &[String], path: &Path) -> Result<Vec<String>> {
    if has_content(inline) {
        warn!(
            chunk,
            path = %path.display(),
            "chunk has inline content and external.file; ignoring inline content"
        );
    }
    read_lines(chunk, path)
}
