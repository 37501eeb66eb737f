//! Base64 codec

use ::base64::Engine;

use super::{Codec, DecodeRequest, BASE64};
use crate::error::CodecFailure;
use crate::namespace::Value;
use crate::options::DecodingOptions;

/// Column width of encoded output lines
pub const LINE_WIDTH: usize = 64;

/// Split encoded text into lines of at most `width` characters
pub fn wrap_lines(encoded: &str, width: usize) -> String {
    encoded
        .as_bytes()
        .chunks(width.max(1))
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Standard-alphabet base64, wrapped at [`LINE_WIDTH`] columns when encoding
pub struct Base64Codec;

impl Base64Codec {
    /// Concatenate body lines, dropping all whitespace
    fn payload(body: &[String]) -> String {
        body.iter()
            .flat_map(|line| line.chars())
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

impl Codec for Base64Codec {
    fn name(&self) -> &str {
        BASE64
    }

    fn decode(&self, request: &DecodeRequest<'_>) -> Result<Value, CodecFailure> {
        let decoded = ::base64::engine::general_purpose::STANDARD.decode(Self::payload(request.body))?;
        Value::from_bytes(decoded, request.as_text)
    }

    fn encode(&self, data: &[u8], _options: &DecodingOptions) -> Result<String, CodecFailure> {
        let encoded = ::base64::engine::general_purpose::STANDARD.encode(data);
        Ok(wrap_lines(&encoded, LINE_WIDTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode(lines: &[&str], as_text: bool) -> Result<Value, CodecFailure> {
        let body: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        let options = DecodingOptions::new();
        Base64Codec.decode(&DecodeRequest {
            body: &body,
            as_text,
            options: &options,
            line_sep: "\n",
        })
    }

    #[test]
    fn test_decode_binary() {
        let value = decode(&["AQIDBA=="], false).unwrap();
        assert_eq!(value, Value::Bytes(vec![0x01, 0x02, 0x03, 0x04]));
    }

    #[test]
    fn test_decode_as_text() {
        let value = decode(&["aGVsbG8gd29y", "bGQ="], true).unwrap();
        assert_eq!(value, Value::Text("hello world".to_string()));
    }

    #[test]
    fn test_decode_ignores_whitespace() {
        let value = decode(&["  AQID ", "", "BA==\r"], false).unwrap();
        assert_eq!(value, Value::Bytes(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode(&["not base64!"], false).unwrap_err();
        assert!(matches!(err, CodecFailure::Base64(_)));
    }

    #[test]
    fn test_decode_text_not_utf8() {
        // 0xFF 0xD8 0xFF
        let err = decode(&["/9j/"], true).unwrap_err();
        assert!(matches!(err, CodecFailure::Utf8(_)));
    }

    #[test]
    fn test_encode_wraps_lines() {
        let data = vec![0xABu8; 100];
        let encoded = Base64Codec.encode(&data, &DecodingOptions::new()).unwrap();
        let lines: Vec<&str> = encoded.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 64);
        assert_eq!(lines[1].len(), 64);
        assert!(!encoded.ends_with('\n'));
    }

    #[test]
    fn test_encode_known_value() {
        let encoded = Base64Codec.encode(&[1, 2, 3, 4], &DecodingOptions::new()).unwrap();
        assert_eq!(encoded, "AQIDBA==");
    }

    proptest! {
        #[test]
        fn prop_roundtrip_and_width(data in proptest::collection::vec(any::<u8>(), 0..600)) {
            let encoded = Base64Codec.encode(&data, &DecodingOptions::new()).unwrap();
            prop_assert!(encoded.lines().all(|line| line.len() <= LINE_WIDTH));

            let lines: Vec<&str> = encoded.lines().collect();
            let decoded = decode(&lines, false).unwrap();
            prop_assert_eq!(decoded, Value::Bytes(data));
        }
    }
}
