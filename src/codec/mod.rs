//! Chunk codecs and the registry that dispatches to them by encoding name

mod asis;
mod b64;
mod pgp;
mod registry;

pub use asis::{join_lines, AsisCodec};
pub use b64::{wrap_lines, Base64Codec, LINE_WIDTH};
pub use pgp::{GpgCli, PgpBackend, PgpCodec, GPG_PROGRAM_ENV};
pub use registry::CodecRegistry;

use crate::error::CodecFailure;
use crate::namespace::Value;
use crate::options::DecodingOptions;

pub const ASIS: &str = "asis";
pub const BASE64: &str = "base64";
pub const PGP: &str = "pgp";

/// Input handed to [`Codec::decode`]
#[derive(Debug, Clone, Copy)]
pub struct DecodeRequest<'a> {
    /// Body lines in chunk order
    pub body: &'a [String],
    /// `true` for text-format chunks, which must decode to [`Value::Text`]
    pub as_text: bool,
    pub options: &'a DecodingOptions,
    /// Separator for codecs that rebuild text from lines
    pub line_sep: &'a str,
}

/// A decode/encode pair for one encoding
pub trait Codec: Send + Sync {
    /// Encoding name used in chunk options
    fn name(&self) -> &str;

    /// Decode a chunk body, honoring `request.as_text`
    fn decode(&self, request: &DecodeRequest<'_>) -> Result<Value, CodecFailure>;

    /// Whether [`Codec::encode`] is meaningful for this codec
    fn can_encode(&self) -> bool {
        true
    }

    /// Check encode preconditions on `options` without touching any data
    fn check_encode_options(&self, options: &DecodingOptions) -> Result<(), CodecFailure> {
        let _ = options;
        Ok(())
    }

    /// Encode raw bytes into chunk body text
    fn encode(&self, data: &[u8], options: &DecodingOptions) -> Result<String, CodecFailure> {
        let _ = (data, options);
        Err(CodecFailure::EncodeUnsupported(self.name().to_string()))
    }
}
