//! Query hash used as a cache key for compiled queries

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::parameters::Parameters;

/// Accumulates query inputs into a buffer and produces a SHA-256 hex digest.
///
/// Unordered inputs (parameter tables, JSON objects) are hashed with their
/// keys sorted, so equivalent inputs always hash alike.
#[derive(Debug, Default)]
pub struct QueryHashCalculator {
    buffer: Vec<u8>,
}

impl QueryHashCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length-prefixed, so adjacent strings cannot run together.
    pub fn write_str(&mut self, value: &str) -> &mut Self {
        self.buffer
            .extend_from_slice(&(value.len() as u64).to_le_bytes());
        self.buffer.extend_from_slice(value.as_bytes());
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        let encoded: i32 = if value { 2 } else { 1 };
        self.buffer.extend_from_slice(&encoded.to_le_bytes());
        self
    }

    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_optional_u64(&mut self, value: Option<u64>) -> &mut Self {
        match value {
            Some(v) => self.write_u64(v),
            None => self.write_str("null"),
        }
    }

    pub fn write_parameters(&mut self, parameters: &Parameters) -> &mut Self {
        if parameters.is_empty() {
            return self.write_str("null-dic<string,object>");
        }
        self.write_u64(parameters.len() as u64);
        for (name, value) in parameters.sorted() {
            self.write_str(name);
            self.write_value(value);
        }
        self
    }

    pub fn write_value(&mut self, value: &Value) -> &mut Self {
        match value {
            Value::Null => self.write_str("null"),
            Value::Bool(b) => self.write_bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.write_i64(i)
                } else if let Some(u) = n.as_u64() {
                    self.write_u64(u)
                } else {
                    let f = n.as_f64().unwrap_or_default();
                    self.buffer.extend_from_slice(&f.to_le_bytes());
                    self
                }
            }
            Value::String(s) => self.write_str(s),
            Value::Array(items) => {
                self.write_u64(items.len() as u64);
                for item in items {
                    self.write_value(item);
                }
                self
            }
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                self.write_u64(keys.len() as u64);
                for key in keys {
                    self.write_str(key);
                    self.write_value(&map[key]);
                }
                self
            }
        }
    }

    /// Hex-encoded SHA-256 of everything written so far
    pub fn finish(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.buffer);
        hex::encode(hasher.finalize())
    }
}
