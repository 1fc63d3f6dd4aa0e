use serde::de::DeserializeOwned;
use std::fmt;

/// Maps a caller-facing field name onto the name stored in the index.
pub trait FieldInferrer: Send + Sync + fmt::Debug {
    fn infer(&self, name: &str) -> String;
}

/// A payload type a hit's `_source` can be decoded into.
///
/// Blanket-implemented; any owned, thread-safe, deserializable type qualifies.
pub trait HitSource: DeserializeOwned + fmt::Debug + Send + Sync + 'static {}

impl<T> HitSource for T where T: DeserializeOwned + fmt::Debug + Send + Sync + 'static {}
