//! In-memory, replayable copy of one hit document.
use serde_json::{Map, Value};

use polyhit_core::{Error, Result};

/// One hit object read off the token stream.
///
/// The snapshot is read twice: loosely by the type selector and strictly by
/// the materializer. [`DocumentSnapshot::reader`] hands out a fresh
/// deserializer over the same tree for each pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    root: Value,
}

impl DocumentSnapshot {
    /// Wrap an already parsed document. Anything but an object is malformed.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(_) => Ok(Self { root: value }),
            other => Err(Error::MalformedDocument(format!(
                "expected a hit object, found {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn from_slice(json: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(json).map_err(|e| Error::MalformedDocument(e.to_string()))?;
        Self::from_value(value)
    }

    /// A `serde::Deserializer` positioned at the start of the document.
    pub fn reader(&self) -> &Value {
        &self.root
    }

    pub fn get(&self, member: &str) -> Option<&Value> {
        self.root.get(member)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        match &self.root {
            Value::Object(map) => map,
            _ => unreachable!("snapshot root is always an object"),
        }
    }

    /// Compact JSON of the document, cut to at most `limit` bytes.
    pub fn fragment(&self, limit: usize) -> String {
        let mut json = self.root.to_string();
        if json.len() > limit {
            let mut end = limit;
            while !json.is_char_boundary(end) {
                end -= 1;
            }
            json.truncate(end);
            json.push_str("...");
        }
        json
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
