//! Decoded values and the evaluation namespace they are bound into

use std::collections::HashMap;

use crate::error::CodecFailure;

/// A decoded chunk value
///
/// Text-format chunks always decode to [`Value::Text`], binary-format
/// chunks to [`Value::Bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Build a value from raw bytes, converting to text when requested
    pub fn from_bytes(bytes: Vec<u8>, as_text: bool) -> Result<Self, CodecFailure> {
        Value::Bytes(bytes).into_format(as_text)
    }

    /// Convert into the representation demanded by the chunk format
    pub fn into_format(self, as_text: bool) -> Result<Self, CodecFailure> {
        match (self, as_text) {
            (Value::Bytes(bytes), true) => Ok(Value::Text(String::from_utf8(bytes)?)),
            (Value::Text(text), false) => Ok(Value::Bytes(text.into_bytes())),
            (value, _) => Ok(value),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Bytes(_) => None,
        }
    }

    /// Raw bytes of the value (UTF-8 for text)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Text(text) => text.as_bytes(),
            Value::Bytes(bytes) => bytes,
        }
    }
}

/// Shared namespace that chunk values are bound into
///
/// Stands in for the document's evaluation environment: later chunks and
/// the host read values back by name.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`, returning the binding it replaced
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.bindings.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Binding names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
