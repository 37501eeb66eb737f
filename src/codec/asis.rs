//! Pass-through text codec

use super::{Codec, DecodeRequest, ASIS};
use crate::error::CodecFailure;
use crate::namespace::Value;

/// Join body lines with `sep`
pub fn join_lines(body: &[String], sep: &str) -> String {
    body.join(sep)
}

/// Text written as-is in the chunk; decode only
pub struct AsisCodec;

impl Codec for AsisCodec {
    fn name(&self) -> &str {
        ASIS
    }

    fn decode(&self, request: &DecodeRequest<'_>) -> Result<Value, CodecFailure> {
        let text = join_lines(request.body, request.line_sep);
        Value::Text(text).into_format(request.as_text)
    }

    fn can_encode(&self) -> bool {
        false
    }
}
