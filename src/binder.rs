//! Delivers decoded values to their output targets

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::directive::ChunkDirective;
use crate::error::{ChunkError, Result};
use crate::namespace::{Environment, Value};

/// Write a value to `path`
///
/// Text goes through a line-oriented write that guarantees a trailing
/// newline. Bytes are written exactly as given.
pub fn write_value(path: &Path, value: &Value) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    match value {
        Value::Text(text) => write_text(path, text),
        Value::Bytes(bytes) => fs::write(path, bytes),
    }
}

/// Text write with trailing newline
pub fn write_text(path: &Path, text: &str) -> io::Result<()> {
    let mut content = String::with_capacity(text.len() + 1);
    content.push_str(text);
    if !content.ends_with('\n') {
        content.push('\n');
    }
    fs::write(path, content)
}

/// Deliver `value` to every target of `directive`
///
/// The file target is written first so the value can then be moved into
/// the namespace. A write failure is returned at once and nothing is bound.
pub fn bind_outputs(directive: &ChunkDirective, value: Value, env: &mut Environment) -> Result<()> {
    if let Some(path) = directive.output_file() {
        write_value(path, &value).map_err(|source| ChunkError::OutputWrite {
            chunk: directive.id().to_string(),
            path: path.to_path_buf(),
            source,
        })?;
        debug!(chunk = directive.id(), path = %path.display(), "wrote chunk output file");
    }

    if let Some(name) = directive.output_var() {
        if env.bind(name, value).is_some() {
            debug!(chunk = directive.id(), name, "replaced existing binding");
        }
    }

    Ok(())
}
