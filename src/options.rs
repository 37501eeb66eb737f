//! Chunk options as authored in a document, and their resolution into directives

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::codec::{CodecRegistry, ASIS};
use crate::config::EngineConfig;
use crate::directive::{ChunkDirective, Format};
use crate::error::{ChunkError, Result};
use crate::loader;

// Recognized option keys
pub const KEY_FORMAT: &str = "format";
pub const KEY_ENCODING: &str = "encoding";
pub const KEY_DECODING_OPS: &str = "decoding.ops";
pub const KEY_OUTPUT_VAR: &str = "output.var";
pub const KEY_OUTPUT_FILE: &str = "output.file";
pub const KEY_EXTERNAL_FILE: &str = "external.file";
pub const KEY_LINE_SEP: &str = "line.sep";
pub const KEY_ECHO: &str = "echo";
pub const KEY_MAX_ECHO: &str = "max.echo";
pub const KEY_CHECKSUM: &str = "checksum";

const KNOWN_KEYS: &[&str] = &[
    KEY_FORMAT,
    KEY_ENCODING,
    KEY_DECODING_OPS,
    KEY_OUTPUT_VAR,
    KEY_OUTPUT_FILE,
    KEY_EXTERNAL_FILE,
    KEY_LINE_SEP,
    KEY_ECHO,
    KEY_MAX_ECHO,
    KEY_CHECKSUM,
];

/// A single option value as written in a chunk header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<OptionValue>),
    Map(BTreeMap<String, OptionValue>),
}

/// Options attached to a chunk, keyed by option name
pub type RawOptions = BTreeMap<String, OptionValue>;

/// Codec parameters, passed through to the codec untouched
pub type DecodingOptions = BTreeMap<String, OptionValue>;

impl OptionValue {
    /// Parse a bare literal as typed on a command line or in a header
    ///
    /// `true`/`false` become booleans, integers become [`OptionValue::Int`],
    /// a single- or double-quoted literal has its quotes removed, and anything
    /// else is kept as a string.
    pub fn parse_literal(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed {
            "true" | "TRUE" => return OptionValue::Bool(true),
            "false" | "FALSE" => return OptionValue::Bool(false),
            _ => {}
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return OptionValue::Int(n);
        }
        for quote in ['"', '\''] {
            if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
                return OptionValue::Str(trimmed[1..trimmed.len() - 1].to_string());
            }
        }
        OptionValue::Str(trimmed.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render a string, integer or boolean as a string
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            OptionValue::Str(s) => Some(s.clone()),
            OptionValue::Int(n) => Some(n.to_string()),
            OptionValue::Bool(b) => Some(b.to_string()),
            OptionValue::List(_) | OptionValue::Map(_) => None,
        }
    }

    /// A scalar, or a list made only of scalars, rendered as strings
    pub fn to_scalar_list(&self) -> Option<Vec<String>> {
        match self {
            OptionValue::List(items) => items.iter().map(OptionValue::to_scalar_string).collect(),
            scalar => scalar.to_scalar_string().map(|s| vec![s]),
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, OptionValue>> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Str(s) => f.write_str(s),
            OptionValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            OptionValue::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

/// Turns raw chunk options and body lines into a [`ChunkDirective`]
pub struct OptionResolver<'a> {
    registry: &'a CodecRegistry,
    config: &'a EngineConfig,
}

impl<'a> OptionResolver<'a> {
    pub fn new(registry: &'a CodecRegistry, config: &'a EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Validate options and build the directive
    ///
    /// Rules are applied in a fixed order: output target, external file,
    /// format, encoding, decoding options, format/encoding cross-check.
    pub fn resolve(&self, chunk: &str, raw: &RawOptions, body: &[String]) -> Result<ChunkDirective> {
        for key in raw.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                debug!(chunk, key = %key, "ignoring unrecognized chunk option");
            }
        }

        let output_var = self.string_option(chunk, raw, KEY_OUTPUT_VAR)?;
        let output_file = self
            .string_option(chunk, raw, KEY_OUTPUT_FILE)?
            .map(|p| self.config.resolve_path(&PathBuf::from(p)));
        if output_var.is_none() && output_file.is_none() {
            return Err(ChunkError::MissingOutputTarget {
                chunk: chunk.to_string(),
            });
        }

        let external_file = self
            .string_option(chunk, raw, KEY_EXTERNAL_FILE)?
            .map(|p| self.config.resolve_path(&PathBuf::from(p)));
        let body = match &external_file {
            Some(path) => loader::substitute_body(chunk, body, path)?,
            None => body.to_vec(),
        };

        let format = match raw.get(KEY_FORMAT) {
            None => Format::Text,
            Some(value) => value.as_str().and_then(Format::parse).ok_or_else(|| {
                ChunkError::InvalidFormat {
                    chunk: chunk.to_string(),
                    value: value.to_string(),
                }
            })?,
        };

        let encoding = match raw.get(KEY_ENCODING) {
            None => format.default_encoding().to_string(),
            Some(value) => match value.as_str() {
                Some(name) if self.registry.contains(name) => name.to_string(),
                _ => {
                    return Err(ChunkError::InvalidEncoding {
                        chunk: chunk.to_string(),
                        value: value.to_string(),
                        registered: self.registry.names().join(", "),
                    })
                }
            },
        };

        let decoding_options = match raw.get(KEY_DECODING_OPS) {
            None => DecodingOptions::new(),
            Some(OptionValue::Map(map)) => map.clone(),
            Some(_) => {
                return Err(ChunkError::InvalidOptionsType {
                    chunk: chunk.to_string(),
                })
            }
        };

        if encoding == ASIS && format != Format::Text {
            return Err(ChunkError::IncompatibleFormatEncoding {
                chunk: chunk.to_string(),
                format: format.to_string(),
                encoding,
            });
        }

        let line_sep = self
            .string_option(chunk, raw, KEY_LINE_SEP)?
            .unwrap_or_else(|| self.config.default_line_sep.clone());

        let echo = match raw.get(KEY_ECHO) {
            None => false,
            Some(value) => value.as_bool().ok_or_else(|| invalid_value(chunk, KEY_ECHO, "a boolean"))?,
        };

        let max_echo = match raw.get(KEY_MAX_ECHO) {
            None => self.config.default_max_echo,
            Some(OptionValue::Int(n)) if *n >= 0 => *n as usize,
            Some(OptionValue::Str(s)) => s
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid_value(chunk, KEY_MAX_ECHO, "a non-negative integer"))?,
            Some(_) => return Err(invalid_value(chunk, KEY_MAX_ECHO, "a non-negative integer")),
        };

        let checksum = match self.string_option(chunk, raw, KEY_CHECKSUM)? {
            None => None,
            Some(hex) if is_sha256_hex(&hex) => Some(hex.to_ascii_lowercase()),
            Some(_) => return Err(invalid_value(chunk, KEY_CHECKSUM, "a 64-digit hex SHA-256 digest")),
        };

        Ok(ChunkDirective {
            id: chunk.to_string(),
            body,
            format,
            encoding,
            decoding_options,
            output_var,
            output_file,
            external_file,
            line_sep,
            echo,
            max_echo,
            checksum,
        })
    }

    /// Fetch an optional non-empty string option
    fn string_option(&self, chunk: &str, raw: &RawOptions, key: &str) -> Result<Option<String>> {
        match raw.get(key) {
            None => Ok(None),
            Some(OptionValue::Str(s)) if key == KEY_LINE_SEP || !s.is_empty() => Ok(Some(s.clone())),
            Some(_) => Err(invalid_value(chunk, key, "a non-empty string")),
        }
    }
}

fn invalid_value(chunk: &str, key: &str, expected: &'static str) -> ChunkError {
    ChunkError::InvalidOptionValue {
        chunk: chunk.to_string(),
        key: key.to_string(),
        expected,
    }
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}
