//! Selectively requested field values returned alongside a hit's source.
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::FieldInferrer;

/// Name -> value(s) mapping for the `fields` section of a hit.
///
/// The search engine returns every field as an array, even single-valued
/// ones. [`FieldValues::value`] unwraps the first element, [`FieldValues::values`]
/// returns all of them.
///
/// A `FieldValues` is *normalized* once it carries the inferrer of the
/// serializer settings it was produced under; lookups then translate the
/// caller's field name before consulting the map.
#[derive(Clone, Default)]
pub struct FieldValues {
    inferrer: Option<Arc<dyn FieldInferrer>>,
    values: Map<String, Value>,
}

impl FieldValues {
    pub fn new(inferrer: Arc<dyn FieldInferrer>, values: Map<String, Value>) -> Self {
        Self { inferrer: Some(inferrer), values }
    }

    /// Values as read off the wire, not yet attached to an inferrer.
    pub fn raw(values: Map<String, Value>) -> Self {
        Self { inferrer: None, values }
    }

    pub fn is_normalized(&self) -> bool {
        self.inferrer.is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        if let Some(v) = self.values.get(field) {
            return Some(v);
        }
        let inferred = self.inferrer.as_ref()?.infer(field);
        self.values.get(&inferred)
    }

    /// First value of `field`, decoded as `K`.
    pub fn value<K: DeserializeOwned>(&self, field: &str) -> Result<Option<K>> {
        let first = match self.get(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => match items.first() {
                Some(v) => v,
                None => return Ok(None),
            },
            Some(v) => v,
        };
        Ok(Some(K::deserialize(first)?))
    }

    /// All values of `field`, decoded as `K`.
    pub fn values<K: DeserializeOwned>(&self, field: &str) -> Result<Vec<K>> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| K::deserialize(v).map_err(Into::into))
                .collect(),
            Some(v) => Ok(vec![K::deserialize(v)?]),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    /// The values as a loosely typed object, used as a stand-in source
    /// payload when a hit carries no `_source`.
    pub fn to_dynamic(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

impl PartialEq for FieldValues {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl fmt::Debug for FieldValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValues")
            .field("normalized", &self.is_normalized())
            .field("values", &self.values)
            .finish()
    }
}
