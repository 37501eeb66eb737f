//! Error types for chunk resolution, decoding and encoding.

use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by a codec or by the primitive it delegates to.
#[derive(Debug, Error)]
pub enum CodecFailure {
    /// Chunk body is not a valid base64 payload
    #[error("malformed base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes were requested as text but are not UTF-8
    #[error("decoded data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Scoped temporary file could not be created or written
    #[error("temporary file error: {0}")]
    TempFile(#[source] std::io::Error),

    /// Underlying primitive could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Underlying primitive ran and reported failure
    #[error("'{program}' exited with {status}: {stderr}")]
    Backend {
        program: String,
        status: String,
        stderr: String,
    },

    /// Codec option holds a value of the wrong shape
    #[error("option '{key}' must be {expected}")]
    InvalidOption { key: String, expected: &'static str },

    /// Encryption was requested without a `receiver` option
    #[error("option 'receiver' is required to encrypt")]
    MissingRecipient,

    /// Codec has no encode form
    #[error("encoding '{0}' has no encode operation")]
    EncodeUnsupported(String),
}

/// Errors surfaced while turning a chunk into a bound value, or a file into chunk text.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("chunk '{chunk}': one of 'output.var' or 'output.file' must be set")]
    MissingOutputTarget { chunk: String },

    #[error("chunk '{chunk}': cannot read external file '{}': {source}", path.display())]
    ExternalFileUnreadable {
        chunk: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk '{chunk}': invalid format '{value}' (expected 'text' or 'binary')")]
    InvalidFormat { chunk: String, value: String },

    #[error("chunk '{chunk}': invalid encoding '{value}' (registered: {registered})")]
    InvalidEncoding {
        chunk: String,
        value: String,
        registered: String,
    },

    #[error("chunk '{chunk}': 'decoding.ops' must be a key-value mapping")]
    InvalidOptionsType { chunk: String },

    #[error("chunk '{chunk}': encoding '{encoding}' cannot be used with format '{format}'")]
    IncompatibleFormatEncoding {
        chunk: String,
        format: String,
        encoding: String,
    },

    #[error("chunk '{chunk}': option '{key}' must be {expected}")]
    InvalidOptionValue {
        chunk: String,
        key: String,
        expected: &'static str,
    },

    #[error("encoding '{encoding}' requires a 'receiver' option")]
    MissingRecipient { encoding: String },

    #[error("chunk '{chunk}': no codec registered for encoding '{encoding}'")]
    UnknownEncoding { chunk: String, encoding: String },

    #[error("no codec registered for encoding '{encoding}' (registered: {registered})")]
    UnregisteredEncoding { encoding: String, registered: String },

    #[error("encoding '{encoding}' cannot be used to encode files")]
    UnsupportedEncodeEncoding { encoding: String },

    #[error("cannot read source file '{}': {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write encoded output to '{}': {source}", path.display())]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk '{chunk}': cannot write '{}': {source}", path.display())]
    OutputWrite {
        chunk: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk '{chunk}': checksum mismatch (expected {expected}, got {actual})")]
    ChecksumMismatch {
        chunk: String,
        expected: String,
        actual: String,
    },

    #[error("chunk '{chunk}': {encoding} codec failed: {source}")]
    Codec {
        chunk: String,
        encoding: String,
        #[source]
        source: CodecFailure,
    },

    #[error("{encoding} encode failed: {source}")]
    Encode {
        encoding: String,
        #[source]
        source: CodecFailure,
    },
}

pub type Result<T, E = ChunkError> = std::result::Result<T, E>;
