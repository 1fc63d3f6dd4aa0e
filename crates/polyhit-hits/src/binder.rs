//! Field side channel: attaches normalized field values to a materialized hit.
//!
//! `Hit::fields` is not reachable through the public API. It is written here,
//! exactly once per hit, by a [`FieldsSetter`] bound to the hit's concrete type.
use std::marker::PhantomData;
use std::sync::Arc;

use polyhit_core::{Error, FieldInferrer, FieldValues, HitSource, Result};

use crate::concrete::{ConcreteType, TypeKey};
use crate::hit::{AnyHit, DynHit, Hit};
use crate::registry::HitRegistry;

/// Knows how to set the fields payload on hits of one concrete type.
pub trait FieldsSetter: Send + Sync {
    fn concrete_type(&self) -> TypeKey;

    fn set_fields(&self, hit: &mut dyn AnyHit, fields: FieldValues) -> Result<()>;
}

pub struct SetFields<T>(PhantomData<fn() -> T>);

impl<T: HitSource> SetFields<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    pub(crate) fn derive() -> Arc<dyn FieldsSetter> {
        Arc::new(Self::new())
    }

    fn set(hit: &mut Hit<T>, fields: FieldValues) -> Result<()> {
        if hit.fields.is_normalized() {
            return Err(Error::ContractViolation(format!(
                "fields of hit `{}` ({}) bound twice",
                hit.id,
                TypeKey::of::<T>().name()
            )));
        }
        hit.fields = fields;
        Ok(())
    }
}

impl<T: HitSource> Default for SetFields<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HitSource> FieldsSetter for SetFields<T> {
    fn concrete_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn set_fields(&self, hit: &mut dyn AnyHit, fields: FieldValues) -> Result<()> {
        let actual = hit.concrete_type();
        match hit.as_any_mut().downcast_mut::<Hit<T>>() {
            Some(hit) => Self::set(hit, fields),
            None => Err(Error::ContractViolation(format!(
                "fields setter for `{}` handed a hit of `{}`",
                TypeKey::of::<T>().name(),
                actual.name()
            ))),
        }
    }
}

/// Bind `fields` onto a hit materialized for a selector-chosen type.
///
/// The setter comes from the registry's per-type cache.
pub fn bind_selected(
    registry: &HitRegistry,
    hit: &mut DynHit,
    concrete: ConcreteType,
    fields: FieldValues,
) -> Result<()> {
    if !fields.is_normalized() {
        return Err(Error::ContractViolation(format!(
            "unnormalized field values offered for `{}`",
            concrete.name()
        )));
    }
    let setter = registry.field_setter(concrete);
    setter.set_fields(hit.erased_mut(), fields)
}

/// Normalize the raw fields a statically typed hit was populated with.
pub fn bind_declared<T: HitSource>(hit: &mut Hit<T>, inferrer: &Arc<dyn FieldInferrer>) -> Result<()> {
    let raw = std::mem::take(&mut hit.fields);
    if raw.is_normalized() {
        hit.fields = raw;
        return Err(Error::ContractViolation(format!(
            "fields of hit `{}` ({}) bound twice",
            hit.id,
            TypeKey::of::<T>().name()
        )));
    }
    SetFields::<T>::set(hit, FieldValues::new(Arc::clone(inferrer), raw.into_map()))
}
