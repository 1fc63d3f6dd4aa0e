//! The hit wrapper and its type-erased form.
use serde_json::Value;
use std::any::{type_name, Any};
use std::fmt;
use std::ops::Deref;

use polyhit_core::{Explanation, FieldValues, Highlight, HitSource};

use crate::concrete::TypeKey;

/// One ranked result of a search response, with its source decoded as `T`.
///
/// `fields` is not public: the engine replaces whatever the populator read
/// with a normalized [`FieldValues`] before a hit is handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<T> {
    pub index: String,
    pub type_name: String,
    pub id: String,
    pub score: Option<f64>,
    pub version: Option<i64>,
    pub source: Option<T>,
    pub(crate) fields: FieldValues,
    pub sorts: Option<Vec<Value>>,
    pub highlight: Option<Highlight>,
    pub explanation: Option<Explanation>,
}

impl<T> Default for Hit<T> {
    fn default() -> Self {
        Self {
            index: String::new(),
            type_name: String::new(),
            id: String::new(),
            score: None,
            version: None,
            source: None,
            fields: FieldValues::default(),
            sorts: None,
            highlight: None,
            explanation: None,
        }
    }
}

impl<T> Hit<T> {
    pub fn fields(&self) -> &FieldValues {
        &self.fields
    }

    pub fn source(&self) -> Option<&T> {
        self.source.as_ref()
    }

    pub fn into_source(self) -> Option<T> {
        self.source
    }
}

/// Object-safe view of a `Hit<T>` whose `T` was chosen at runtime.
pub trait AnyHit: Any + Send + Sync + fmt::Debug {
    fn concrete_type(&self) -> TypeKey;
    fn index(&self) -> &str;
    fn type_name(&self) -> &str;
    fn id(&self) -> &str;
    fn score(&self) -> Option<f64>;
    fn version(&self) -> Option<i64>;
    fn fields(&self) -> &FieldValues;
    fn sorts(&self) -> Option<&[Value]>;
    fn highlight(&self) -> Option<&Highlight>;
    fn explanation(&self) -> Option<&Explanation>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: HitSource> AnyHit for Hit<T> {
    fn concrete_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn index(&self) -> &str {
        &self.index
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn score(&self) -> Option<f64> {
        self.score
    }

    fn version(&self) -> Option<i64> {
        self.version
    }

    fn fields(&self) -> &FieldValues {
        &self.fields
    }

    fn sorts(&self) -> Option<&[Value]> {
        self.sorts.as_deref()
    }

    fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A hit whose concrete payload type is only known at runtime.
///
/// Dereferences to [`AnyHit`] for the metadata every hit shares; recover the
/// typed `Hit<T>` with [`DynHit::downcast`] or [`DynHit::downcast_ref`].
#[derive(Debug)]
pub struct DynHit {
    inner: Box<dyn AnyHit>,
}

impl DynHit {
    pub fn new<T: HitSource>(hit: Hit<T>) -> Self {
        Self { inner: Box::new(hit) }
    }

    pub fn is<T: HitSource>(&self) -> bool {
        self.inner.as_any().is::<Hit<T>>()
    }

    pub fn downcast_ref<T: HitSource>(&self) -> Option<&Hit<T>> {
        self.inner.as_any().downcast_ref::<Hit<T>>()
    }

    pub fn source_as<T: HitSource>(&self) -> Option<&T> {
        self.downcast_ref::<T>().and_then(Hit::source)
    }

    /// Gives the hit back unchanged if it does not hold a `Hit<T>`.
    pub fn downcast<T: HitSource>(self) -> Result<Hit<T>, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.inner.into_any().downcast::<Hit<T>>() {
            Ok(hit) => Ok(*hit),
            Err(_) => unreachable!("checked to be Hit<{}>", type_name::<T>()),
        }
    }

    pub(crate) fn erased_mut(&mut self) -> &mut dyn AnyHit {
        self.inner.as_mut()
    }
}

impl Deref for DynHit {
    type Target = dyn AnyHit;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Doc {
        v: u32,
    }

    type Other = String;

    fn sample() -> Hit<Doc> {
        Hit { index: "i".into(), id: "1".into(), source: Some(Doc { v: 1 }), ..Hit::default() }
    }

    #[test]
    fn dyn_hit_exposes_shared_metadata() {
        let hit = DynHit::new(sample());
        assert_eq!(hit.index(), "i");
        assert_eq!(hit.id(), "1");
        assert_eq!(hit.concrete_type(), TypeKey::of::<Doc>());
        assert_eq!(hit.source_as::<Doc>(), Some(&Doc { v: 1 }));
    }

    #[test]
    fn downcast_to_wrong_type_returns_the_hit() {
        let hit = DynHit::new(sample());
        assert!(!hit.is::<Other>());
        let hit = hit.downcast::<Other>().unwrap_err();
        let typed = hit.downcast::<Doc>().unwrap();
        assert_eq!(typed, sample());
    }
}
