//! Per-session deserialization context.
use serde::de::{self, DeserializeSeed};
use serde_json::error::Category;
use serde_json::Value;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use polyhit_core::{Error, HitSource, Result, SerializerSettings};

use crate::concrete::{ConcreteType, TypeKey};
use crate::converter::ConcreteTypeConverter;
use crate::hit::DynHit;
use crate::registry::HitRegistry;
use crate::response::{HitSeed, HitsSeed, SearchResponse, SearchResponseSeed};
use crate::selection::HitView;
use crate::snapshot::DocumentSnapshot;

/// Everything one response parse needs: settings, the shared caches, and
/// the selectors bound for this query only.
///
/// A context belongs to a single session. It is deliberately not `Sync`;
/// concurrent queries each build their own, so a selector bound here is
/// never observed by another query against the same base type.
pub struct DeserializationContext<'r> {
    settings: Arc<SerializerSettings>,
    registry: &'r HitRegistry,
    stateful: HashMap<TypeKey, Box<dyn Any + Send + Sync>>,
    failure: RefCell<Option<Error>>,
}

impl DeserializationContext<'static> {
    pub fn new(settings: Arc<SerializerSettings>) -> Self {
        Self::with_registry(settings, HitRegistry::global())
    }
}

impl<'r> DeserializationContext<'r> {
    pub fn with_registry(settings: Arc<SerializerSettings>, registry: &'r HitRegistry) -> Self {
        Self { settings, registry, stateful: HashMap::new(), failure: RefCell::new(None) }
    }

    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    pub fn registry(&self) -> &'r HitRegistry {
        self.registry
    }

    /// Route every `Hit<B>` read through this context via `selector`.
    ///
    /// Replaces a selector previously bound for `B`.
    pub fn bind_selector<B, F>(&mut self, selector: F) -> &mut Self
    where
        B: HitSource,
        F: Fn(&Value, &HitView<'_>) -> ConcreteType + Send + Sync + 'static,
    {
        let converter = ConcreteTypeConverter::<B>::with_selector(selector);
        let base = converter.base_type();
        if self.stateful.insert(base, Box::new(converter)).is_some() {
            trace!(base = base.name(), "replaced selector");
        } else {
            trace!(base = base.name(), "bound selector");
        }
        self
    }

    /// Builder form of [`DeserializationContext::bind_selector`].
    pub fn selecting<B, F>(mut self, selector: F) -> Self
    where
        B: HitSource,
        F: Fn(&Value, &HitView<'_>) -> ConcreteType + Send + Sync + 'static,
    {
        self.bind_selector::<B, F>(selector);
        self
    }

    pub fn unbind<B: HitSource>(&mut self) -> bool {
        self.stateful.remove(&TypeKey::of::<B>()).is_some()
    }

    /// The selector-bound converter for base type `B`, if this session has one.
    pub fn stateful_converter<B: HitSource>(&self) -> Option<&ConcreteTypeConverter<B>> {
        self.stateful
            .get(&TypeKey::of::<B>())
            .and_then(|c| c.downcast_ref::<ConcreteTypeConverter<B>>())
    }

    /// Read a single hit object.
    pub fn read_hit<B: HitSource>(&self, json: &[u8]) -> Result<DynHit> {
        let converter = self.registry.converter::<B>()?;
        self.run(json, HitSeed::new(self, &converter))
    }

    /// Read a JSON array of hit objects, preserving document order.
    pub fn read_hits<B: HitSource>(&self, json: &[u8]) -> Result<Vec<DynHit>> {
        let converter = self.registry.converter::<B>()?;
        self.run(json, HitsSeed::new(self, &converter))
    }

    /// Read a full search response body.
    pub fn read_response<B: HitSource>(&self, json: &[u8]) -> Result<SearchResponse> {
        let converter = self.registry.converter::<B>()?;
        self.run(json, SearchResponseSeed::new(self, &converter))
    }

    /// Deserialize one hit from an already captured snapshot.
    pub fn read_snapshot<B: HitSource>(&self, snapshot: &DocumentSnapshot) -> Result<DynHit> {
        self.registry.converter::<B>()?.read_snapshot(snapshot, self)
    }

    /// Record `err` as the session's failure and hand the parser a matching
    /// `D::Error`. The first failure wins.
    pub(crate) fn raise<E: de::Error>(&self, err: Error) -> E {
        let message = err.to_string();
        let mut slot = self.failure.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
        E::custom(message)
    }

    fn run<S, T>(&self, json: &[u8], seed: S) -> Result<T>
    where
        S: for<'de> DeserializeSeed<'de, Value = T>,
    {
        self.failure.borrow_mut().take();
        let mut deserializer = serde_json::Deserializer::from_slice(json);
        let result = seed
            .deserialize(&mut deserializer)
            .and_then(|value| deserializer.end().map(|()| value));
        match result {
            Ok(value) => Ok(value),
            Err(e) => Err(self.classify(e)),
        }
    }

    fn classify(&self, err: serde_json::Error) -> Error {
        if let Some(recorded) = self.failure.borrow_mut().take() {
            return recorded;
        }
        match err.classify() {
            Category::Syntax | Category::Eof => Error::MalformedDocument(err.to_string()),
            Category::Io | Category::Data => Error::Json(err),
        }
    }
}
