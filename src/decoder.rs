//! Chunk decoder: resolves options, decodes the body, and binds the result

use std::sync::Arc;

use tracing::debug;

use crate::binder;
use crate::checksum::sha256_hex;
use crate::codec::{join_lines, CodecRegistry, DecodeRequest, ASIS};
use crate::config::EngineConfig;
use crate::directive::ChunkDirective;
use crate::error::{ChunkError, Result};
use crate::namespace::{Environment, Value};
use crate::options::{OptionResolver, RawOptions};

/// Decodes data chunks handed over by a rendering pipeline
pub struct Decoder {
    registry: Arc<CodecRegistry>,
    config: EngineConfig,
}

impl Decoder {
    /// Decoder with the built-in codecs and default config
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_registry(Arc::new(CodecRegistry::with_builtins()), config)
    }

    pub fn with_registry(registry: Arc<CodecRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate chunk options into a directive
    pub fn resolve(&self, chunk: &str, options: &RawOptions, body: &[String]) -> Result<ChunkDirective> {
        OptionResolver::new(&self.registry, &self.config).resolve(chunk, options, body)
    }

    /// Decode a resolved directive
    ///
    /// The result is text for text-format chunks and bytes for binary ones.
    pub fn decode(&self, directive: &ChunkDirective) -> Result<Value> {
        if directive.encoding() == ASIS {
            return Ok(Value::Text(join_lines(directive.body(), directive.line_sep())));
        }

        let codec = self
            .registry
            .lookup(directive.encoding())
            .ok_or_else(|| ChunkError::UnknownEncoding {
                chunk: directive.id().to_string(),
                encoding: directive.encoding().to_string(),
            })?;
        debug!(chunk = directive.id(), encoding = directive.encoding(), "decoding chunk");

        let request = DecodeRequest {
            body: directive.body(),
            as_text: directive.as_text(),
            options: directive.decoding_options(),
            line_sep: directive.line_sep(),
        };
        codec
            .decode(&request)
            .and_then(|value| value.into_format(directive.as_text()))
            .map_err(|source| ChunkError::Codec {
                chunk: directive.id().to_string(),
                encoding: directive.encoding().to_string(),
                source,
            })
    }

    /// Process one chunk end to end and return its rendered output
    ///
    /// The output is empty unless the chunk sets `echo`.
    pub fn run_chunk(
        &self,
        chunk: &str,
        options: &RawOptions,
        body: &[String],
        env: &mut Environment,
    ) -> Result<String> {
        let directive = self.resolve(chunk, options, body)?;
        let value = self.decode(&directive)?;
        verify_checksum(&directive, &value)?;
        binder::bind_outputs(&directive, value, env)?;
        Ok(render_echo(&directive))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

fn verify_checksum(directive: &ChunkDirective, value: &Value) -> Result<()> {
    let Some(expected) = directive.checksum() else {
        return Ok(());
    };
    let actual = sha256_hex(value.as_bytes());
    if actual != expected {
        return Err(ChunkError::ChecksumMismatch {
            chunk: directive.id().to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Body lines shown in the document when `echo` is set
fn render_echo(directive: &ChunkDirective) -> String {
    if !directive.echo() {
        return String::new();
    }
    let body = directive.body();
    let shown = body.len().min(directive.max_echo());
    let mut out = body[..shown].join("\n");
    if shown < body.len() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionValue;

    fn opts(pairs: &[(&str, OptionValue)]) -> RawOptions {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_asis() {
        let decoder = Decoder::new();
        let mut env = Environment::new();
        let output = decoder
            .run_chunk("c1", &opts(&[("output.var", "t1".into())]), &lines(&["1,2,3,4,5,6", "7,8,9"]), &mut env)
            .unwrap();

        assert!(output.is_empty());
        assert_eq!(env.get("t1"), Some(&Value::Text("1,2,3,4,5,6\n7,8,9".to_string())));
    }

    #[test]
    fn test_decode_asis_custom_separator() {
        let decoder = Decoder::new();
        let directive = decoder
            .resolve("c1", &opts(&[("output.var", "t".into()), ("line.sep", " ".into())]), &lines(&["a", "b"]))
            .unwrap();
        assert_eq!(decoder.decode(&directive).unwrap(), Value::Text("a b".to_string()));
    }

    #[test]
    fn test_decode_base64_binary() {
        let decoder = Decoder::new();
        let directive = decoder
            .resolve(
                "c2",
                &opts(&[("output.var", "b".into()), ("format", "binary".into())]),
                &lines(&["AQIDBA=="]),
            )
            .unwrap();
        assert_eq!(decoder.decode(&directive).unwrap(), Value::Bytes(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_decode_base64_text() {
        let decoder = Decoder::new();
        let directive = decoder
            .resolve(
                "c3",
                &opts(&[("output.var", "t".into()), ("encoding", "base64".into())]),
                &lines(&["aGk="]),
            )
            .unwrap();
        assert_eq!(decoder.decode(&directive).unwrap(), Value::Text("hi".to_string()));
    }

    #[test]
    fn test_codec_error_carries_context() {
        let decoder = Decoder::new();
        let mut env = Environment::new();
        let err = decoder
            .run_chunk(
                "broken",
                &opts(&[("output.var", "b".into()), ("format", "binary".into())]),
                &lines(&["@@@"]),
                &mut env,
            )
            .unwrap_err();

        match &err {
            ChunkError::Codec { chunk, encoding, .. } => {
                assert_eq!(chunk, "broken");
                assert_eq!(encoding, "base64");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(env.is_empty());
    }

    #[test]
    fn test_unknown_encoding_after_resolution() {
        let mut registry = CodecRegistry::new();
        registry.register(crate::codec::Base64Codec);
        let resolving = Decoder::with_registry(Arc::new(registry), EngineConfig::default());
        let directive = resolving
            .resolve("c", &opts(&[("output.var", "x".into()), ("encoding", "base64".into())]), &lines(&["aGk="]))
            .unwrap();

        let empty = Decoder::with_registry(Arc::new(CodecRegistry::new()), EngineConfig::default());
        let err = empty.decode(&directive).unwrap_err();
        assert!(matches!(err, ChunkError::UnknownEncoding { .. }));
    }

    #[test]
    fn test_checksum_verified() {
        let decoder = Decoder::new();
        let mut env = Environment::new();
        let good = sha256_hex(&[1, 2, 3, 4]);
        decoder
            .run_chunk(
                "c",
                &opts(&[("output.var", "b".into()), ("format", "binary".into()), ("checksum", good.into())]),
                &lines(&["AQIDBA=="]),
                &mut env,
            )
            .unwrap();
        assert!(env.contains("b"));

        let bad = sha256_hex(b"other");
        let err = decoder
            .run_chunk(
                "c",
                &opts(&[("output.var", "b2".into()), ("format", "binary".into()), ("checksum", bad.into())]),
                &lines(&["AQIDBA=="]),
                &mut env,
            )
            .unwrap_err();
        assert!(matches!(err, ChunkError::ChecksumMismatch { .. }));
        assert!(!env.contains("b2"));
    }

    #[test]
    fn test_echo_truncated() {
        let decoder = Decoder::new();
        let mut env = Environment::new();
        let output = decoder
            .run_chunk(
                "c",
                &opts(&[("output.var", "t".into()), ("echo", true.into()), ("max.echo", OptionValue::Int(2))]),
                &lines(&["a", "b", "c"]),
                &mut env,
            )
            .unwrap();
        assert_eq!(output, "a\nb\n...");
    }

    #[test]
    fn test_echo_full_body() {
        let decoder = Decoder::new();
        let mut env = Environment::new();
        let output = decoder
            .run_chunk(
                "c",
                &opts(&[("output.var", "t".into()), ("echo", true.into())]),
                &lines(&["a", "b"]),
                &mut env,
            )
            .unwrap();
        assert_eq!(output, "a\nb");
    }
}
