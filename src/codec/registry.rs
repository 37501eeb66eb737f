//! Codec registry
//!
//! Populated once while an engine is built and read-only afterwards.
//! Lookup is by encoding name only.
//!
//! ```
//! use emx_datachunk::codec::CodecRegistry;
//!
//! let registry = CodecRegistry::with_builtins();
//! assert!(registry.contains("base64"));
//! assert_eq!(registry.names(), vec!["asis", "base64", "pgp"]);
//! ```

use std::collections::HashMap;

use super::{AsisCodec, Base64Codec, Codec, PgpCodec};

/// Maps encoding names to codec implementations
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Box<dyn Codec>>,
}

impl CodecRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `asis`, `base64` and `pgp` (backed by the `gpg` executable)
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(AsisCodec);
        registry.register(Base64Codec);
        registry.register(PgpCodec::new());
        registry
    }

    /// Register a codec under its own name, replacing any codec of that name
    pub fn register(&mut self, codec: impl Codec + 'static) {
        self.register_boxed(Box::new(codec));
    }

    pub fn register_boxed(&mut self, codec: Box<dyn Codec>) {
        self.codecs.insert(codec.name().to_string(), codec);
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Codec> {
        self.codecs.get(name).map(|codec| codec.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    /// Registered encoding names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DecodeRequest;
    use crate::error::CodecFailure;
    use crate::namespace::Value;

    struct UpperCodec;

    impl Codec for UpperCodec {
        fn name(&self) -> &str {
            "upper"
        }

        fn decode(&self, request: &DecodeRequest<'_>) -> Result<Value, CodecFailure> {
            Value::Text(request.body.join(request.line_sep).to_uppercase()).into_format(request.as_text)
        }
    }

    #[test]
    fn test_builtins() {
        let registry = CodecRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["asis", "base64", "pgp"]);
        assert!(registry.lookup("base64").is_some());
        assert!(registry.lookup("rot13").is_none());
    }

    #[test]
    fn test_register_custom_codec() {
        let mut registry = CodecRegistry::with_builtins();
        registry.register(UpperCodec);

        let codec = registry.lookup("upper").unwrap();
        assert_eq!(codec.name(), "upper");
        assert!(codec.can_encode());
        assert!(matches!(
            codec.encode(b"x", &Default::default()),
            Err(CodecFailure::EncodeUnsupported(_))
        ));
    }

    #[test]
    fn test_empty_registry() {
        let registry = CodecRegistry::new();
        assert!(registry.names().is_empty());
        assert!(!registry.contains("asis"));
    }
}
