//! Resolved chunk directives

use std::fmt;
use std::path::{Path, PathBuf};

use crate::options::DecodingOptions;

/// Representation the decoded chunk value takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Binary,
}

impl Format {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Format::Text),
            "binary" => Some(Format::Binary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Binary => "binary",
        }
    }

    /// Encoding assumed when a chunk names none
    pub fn default_encoding(&self) -> &'static str {
        match self {
            Format::Text => crate::codec::ASIS,
            Format::Binary => crate::codec::BASE64,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination receiving a decoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    NamedValue(String),
    FilePath(PathBuf),
}

/// A validated, immutable unit of decode work
///
/// Built only by [`OptionResolver`](crate::options::OptionResolver), so every
/// directive already satisfies the option rules: at least one output target,
/// a registered encoding, and no `asis` binary chunks.
#[derive(Debug, Clone)]
pub struct ChunkDirective {
    pub(crate) id: String,
    pub(crate) body: Vec<String>,
    pub(crate) format: Format,
    pub(crate) encoding: String,
    pub(crate) decoding_options: DecodingOptions,
    pub(crate) output_var: Option<String>,
    pub(crate) output_file: Option<PathBuf>,
    pub(crate) external_file: Option<PathBuf>,
    pub(crate) line_sep: String,
    pub(crate) echo: bool,
    pub(crate) max_echo: usize,
    pub(crate) checksum: Option<String>,
}

impl ChunkDirective {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Body lines to decode (external file content when one was given)
    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn decoding_options(&self) -> &DecodingOptions {
        &self.decoding_options
    }

    pub fn output_var(&self) -> Option<&str> {
        self.output_var.as_deref()
    }

    /// Output file, already resolved against the engine base directory
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn external_file(&self) -> Option<&Path> {
        self.external_file.as_deref()
    }

    pub fn line_sep(&self) -> &str {
        &self.line_sep
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    pub fn max_echo(&self) -> usize {
        self.max_echo
    }

    /// Expected SHA-256 of the decoded value, lowercase hex
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn as_text(&self) -> bool {
        self.format == Format::Text
    }

    pub fn targets(&self) -> Vec<OutputTarget> {
        let mut targets = Vec::with_capacity(2);
        if let Some(name) = &self.output_var {
            targets.push(OutputTarget::NamedValue(name.clone()));
        }
        if let Some(path) = &self.output_file {
            targets.push(OutputTarget::FilePath(path.clone()));
        }
        targets
    }
}
