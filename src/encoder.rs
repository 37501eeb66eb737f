//! Encode helper: turns a file into text that can be pasted into a data chunk

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::binder::write_text;
use crate::codec::{Codec, CodecRegistry};
use crate::error::{ChunkError, CodecFailure, Result};
use crate::options::DecodingOptions;

/// Encodes file contents for embedding in a chunk
pub struct Encoder {
    registry: Arc<CodecRegistry>,
}

impl Encoder {
    /// Encoder with the built-in codecs
    pub fn new() -> Self {
        Self::with_registry(Arc::new(CodecRegistry::with_builtins()))
    }

    pub fn with_registry(registry: Arc<CodecRegistry>) -> Self {
        Self { registry }
    }

    /// Look up a codec for encoding and check its option preconditions
    ///
    /// Nothing is read or encoded, so configuration errors surface before
    /// any I/O.
    pub fn check(&self, encoding: &str, options: &DecodingOptions) -> Result<&dyn Codec> {
        let codec = self
            .registry
            .lookup(encoding)
            .ok_or_else(|| ChunkError::UnregisteredEncoding {
                encoding: encoding.to_string(),
                registered: self.registry.names().join(", "),
            })?;
        if !codec.can_encode() {
            return Err(ChunkError::UnsupportedEncodeEncoding {
                encoding: encoding.to_string(),
            });
        }
        codec
            .check_encode_options(options)
            .map_err(|source| encode_error(encoding, source))?;
        Ok(codec)
    }

    /// Encode bytes with the named codec
    pub fn encode(&self, data: &[u8], encoding: &str, options: &DecodingOptions) -> Result<String> {
        let codec = self.check(encoding, options)?;
        codec
            .encode(data, options)
            .map_err(|source| encode_error(encoding, source))
    }

    /// Encode bytes, also writing the text to `destination` when given
    pub fn encode_to(
        &self,
        data: &[u8],
        encoding: &str,
        options: &DecodingOptions,
        destination: Option<&Path>,
    ) -> Result<String> {
        let encoded = self.encode(data, encoding, options)?;
        if let Some(path) = destination {
            write_text(path, &encoded).map_err(|err| ChunkError::DestinationUnwritable {
                path: path.to_path_buf(),
                source: err,
            })?;
        }
        Ok(encoded)
    }

    /// Encode the contents of `source`
    ///
    /// The encoded text is always returned; when `destination` is given it
    /// is also written there.
    pub fn encode_file(
        &self,
        source: &Path,
        encoding: &str,
        options: &DecodingOptions,
        destination: Option<&Path>,
    ) -> Result<String> {
        self.check(encoding, options)?;
        let data = fs::read(source).map_err(|err| ChunkError::SourceUnreadable {
            path: source.to_path_buf(),
            source: err,
        })?;
        self.encode_to(&data, encoding, options, destination)
    }
}

fn encode_error(encoding: &str, source: CodecFailure) -> ChunkError {
    match source {
        CodecFailure::MissingRecipient => ChunkError::MissingRecipient {
            encoding: encoding.to_string(),
        },
        CodecFailure::EncodeUnsupported(_) => ChunkError::UnsupportedEncodeEncoding {
            encoding: encoding.to_string(),
        },
        source => ChunkError::Encode {
            encoding: encoding.to_string(),
            source,
        },
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_base64() {
        let encoder = Encoder::new();
        let encoded = encoder.encode(&[1, 2, 3, 4], "base64", &DecodingOptions::new()).unwrap();
        assert_eq!(encoded, "AQIDBA==");
    }

    #[test]
    fn test_encode_asis_rejected() {
        let encoder = Encoder::new();
        let err = encoder.encode(b"x", "asis", &DecodingOptions::new()).unwrap_err();
        assert!(matches!(err, ChunkError::UnsupportedEncodeEncoding { .. }));
    }

    #[test]
    fn test_encode_file_asis_rejected_before_read() {
        let encoder = Encoder::new();
        let err = encoder
            .encode_file(Path::new("/does/not/exist"), "asis", &DecodingOptions::new(), None)
            .unwrap_err();
        assert!(matches!(err, ChunkError::UnsupportedEncodeEncoding { .. }));
    }

    #[test]
    fn test_encode_unknown_encoding() {
        let encoder = Encoder::new();
        let err = encoder.encode(b"x", "rot13", &DecodingOptions::new()).unwrap_err();
        match err {
            ChunkError::UnregisteredEncoding { encoding, registered } => {
                assert_eq!(encoding, "rot13");
                assert_eq!(registered, "asis, base64, pgp");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_encode_pgp_without_receiver() {
        let encoder = Encoder::new();
        let err = encoder.encode(b"secret", "pgp", &DecodingOptions::new()).unwrap_err();
        assert!(matches!(err, ChunkError::MissingRecipient { ref encoding } if encoding == "pgp"));
    }

    #[test]
    fn test_encode_file_missing_receiver_before_read() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = Encoder::new();
        let err = encoder
            .encode_file(&dir.path().join("missing"), "pgp", &DecodingOptions::new(), None)
            .unwrap_err();
        assert!(matches!(err, ChunkError::MissingRecipient { .. }));
    }

    #[test]
    fn test_encode_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.b64");

        let encoded = Encoder::new()
            .encode_to(&[1, 2, 3, 4], "base64", &DecodingOptions::new(), Some(&dest))
            .unwrap();

        assert_eq!(encoded, "AQIDBA==");
        assert_eq!(fs::read_to_string(&dest).unwrap(), "AQIDBA==\n");
    }

    #[test]
    fn test_encode_file_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("data.bin");
        let dest = dir.path().join("data.b64");
        fs::write(&source, [0xFFu8, 0xD8, 0xFF]).unwrap();

        let encoder = Encoder::new();
        let encoded = encoder
            .encode_file(&source, "base64", &DecodingOptions::new(), Some(&dest))
            .unwrap();

        assert_eq!(encoded, "/9j/");
        assert_eq!(fs::read_to_string(&dest).unwrap(), "/9j/\n");
    }

    #[test]
    fn test_encode_file_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = Encoder::new();
        let err = encoder
            .encode_file(&dir.path().join("missing"), "base64", &DecodingOptions::new(), None)
            .unwrap_err();
        assert!(matches!(err, ChunkError::SourceUnreadable { .. }));
    }
}
