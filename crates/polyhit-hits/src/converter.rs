//! Per-hit deserialization state machine.
//!
//! ```text
//! selector bound for B?  yes -> SNAPSHOT -> SELECT_TYPE -> MATERIALIZE -> BIND_FIELDS
//!                        no  -> POPULATE Hit<B> off the stream          -> BIND_FIELDS
//! ```
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use polyhit_core::{Error, HitSource, Result};

use crate::binder::{bind_declared, bind_selected};
use crate::concrete::{ConcreteType, TypeKey};
use crate::context::DeserializationContext;
use crate::hit::{DynHit, Hit};
use crate::materialize::{materialize, materialize_declared};
use crate::populate::HitVisitor;
use crate::selection::{select, HitView, Selector};
use crate::snapshot::DocumentSnapshot;

/// Deserializes hits declared as `Hit<B>`.
///
/// The default instance (cached in the registry) is stateless. A stateful
/// instance carries the selector of one query and lives only in the
/// [`DeserializationContext`] of that query.
pub struct ConcreteTypeConverter<B> {
    base_type: TypeKey,
    selector: Option<Arc<Selector>>,
    _base: PhantomData<fn() -> B>,
}

impl<B: HitSource> ConcreteTypeConverter<B> {
    pub(crate) fn new() -> Self {
        Self { base_type: TypeKey::of::<B>(), selector: None, _base: PhantomData }
    }

    pub fn with_selector<F>(selector: F) -> Self
    where
        F: Fn(&Value, &HitView<'_>) -> ConcreteType + Send + Sync + 'static,
    {
        Self { base_type: TypeKey::of::<B>(), selector: Some(Arc::new(selector)), _base: PhantomData }
    }

    pub fn base_type(&self) -> TypeKey {
        self.base_type
    }

    pub fn is_stateful(&self) -> bool {
        self.selector.is_some()
    }

    /// The converter whose selector applies under `ctx`: the one bound to the
    /// session wins over this one.
    fn selecting<'a>(&'a self, ctx: &'a DeserializationContext<'_>) -> Option<&'a Self> {
        ctx.stateful_converter::<B>().or_else(|| self.is_stateful().then_some(self))
    }

    /// Read one hit from `deserializer`.
    ///
    /// Engine failures are recorded on `ctx` before being turned into
    /// `D::Error`, so the caller of the outer parse gets them back unchanged.
    pub fn read<'de, D>(&self, deserializer: D, ctx: &DeserializationContext<'_>) -> std::result::Result<DynHit, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(converter) = self.selecting(ctx) else {
            return self.read_direct(deserializer, ctx);
        };
        let value = Value::deserialize(deserializer)?;
        DocumentSnapshot::from_value(value)
            .and_then(|snapshot| converter.read_selected(&snapshot, ctx))
            .map_err(|e| ctx.raise(e))
    }

    /// Deserialize one hit from an already captured snapshot.
    pub fn read_snapshot(&self, snapshot: &DocumentSnapshot, ctx: &DeserializationContext<'_>) -> Result<DynHit> {
        match self.selecting(ctx) {
            Some(converter) => converter.read_selected(snapshot, ctx),
            None => self.read_declared(snapshot, ctx),
        }
    }

    fn read_selected(&self, snapshot: &DocumentSnapshot, ctx: &DeserializationContext<'_>) -> Result<DynHit> {
        let selector = self.selector.as_deref().ok_or_else(|| {
            Error::ContractViolation(format!("selector path taken for `{}` without a selector", self.base_type.name()))
        })?;
        let (concrete, view) = select(snapshot, self.base_type, selector, ctx.settings());
        let mut hit = materialize(concrete, snapshot, ctx.settings())?;
        bind_selected(ctx.registry(), &mut hit, concrete, view.fields)?;
        Ok(hit)
    }

    /// Populate `Hit<B>` off the token stream, with no intermediate tree.
    fn read_direct<'de, D>(&self, deserializer: D, ctx: &DeserializationContext<'_>) -> std::result::Result<DynHit, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut hit = deserializer.deserialize_any(DeclaredHit::<B> { ctx, _base: PhantomData })?;
        bind_declared(&mut hit, ctx.settings().inferrer()).map_err(|e| ctx.raise(e))?;
        Ok(DynHit::new(hit))
    }

    fn read_declared(&self, snapshot: &DocumentSnapshot, ctx: &DeserializationContext<'_>) -> Result<DynHit> {
        let mut hit = materialize_declared::<B>(snapshot, ctx.settings())?;
        bind_declared(&mut hit, ctx.settings().inferrer())?;
        Ok(DynHit::new(hit))
    }
}

/// Visitor for the direct path. Objects go to the populator; anything else
/// is a malformed document.
struct DeclaredHit<'a, 'r, B> {
    ctx: &'a DeserializationContext<'r>,
    _base: PhantomData<fn() -> B>,
}

impl<B> DeclaredHit<'_, '_, B> {
    fn malformed<E: de::Error>(&self, found: &str) -> E {
        self.ctx.raise(Error::MalformedDocument(format!("expected a hit object, found {found}")))
    }
}

impl<'de, B: HitSource> Visitor<'de> for DeclaredHit<'_, '_, B> {
    type Value = Hit<B>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a search hit object")
    }

    fn visit_map<A>(self, map: A) -> std::result::Result<Hit<B>, A::Error>
    where
        A: MapAccess<'de>,
    {
        HitVisitor::<B>::new().visit_map(map)
    }

    fn visit_seq<A>(self, _seq: A) -> std::result::Result<Hit<B>, A::Error>
    where
        A: SeqAccess<'de>,
    {
        Err(self.malformed("an array"))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> std::result::Result<Hit<B>, E> {
        Err(self.malformed("a boolean"))
    }

    fn visit_i64<E: de::Error>(self, _v: i64) -> std::result::Result<Hit<B>, E> {
        Err(self.malformed("a number"))
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> std::result::Result<Hit<B>, E> {
        Err(self.malformed("a number"))
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> std::result::Result<Hit<B>, E> {
        Err(self.malformed("a number"))
    }

    fn visit_str<E: de::Error>(self, _v: &str) -> std::result::Result<Hit<B>, E> {
        Err(self.malformed("a string"))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Hit<B>, E> {
        Err(self.malformed("null"))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Hit<B>, E> {
        Err(self.malformed("null"))
    }
}

impl<B> fmt::Debug for ConcreteTypeConverter<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcreteTypeConverter")
            .field("base_type", &self.base_type)
            .field("stateful", &self.selector.is_some())
            .finish()
    }
}
