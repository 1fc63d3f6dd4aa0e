//! Process-wide, append-only caches keyed by type identity.
//!
//! Two independent caches live here:
//! - wrapper type (`Hit<B>`) -> the stateless default converter for it
//! - concrete type -> the field setter bound to it
//!
//! Both are read-through: check, compute on a miss, try to insert, and fall
//! back to whichever entry won if another thread inserted first. Entries are
//! never evicted; the key space is bounded by the caller's own types.
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::Any;
use std::sync::Arc;
use tracing::trace;

use polyhit_core::{Error, HitSource, Result};

use crate::binder::FieldsSetter;
use crate::concrete::{ConcreteType, TypeKey};
use crate::converter::ConcreteTypeConverter;
use crate::hit::Hit;

static GLOBAL: Lazy<HitRegistry> = Lazy::new(HitRegistry::new);

type ErasedConverter = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct HitRegistry {
    converters: DashMap<TypeKey, ErasedConverter>,
    field_setters: DashMap<TypeKey, Arc<dyn FieldsSetter>>,
}

impl HitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every context that does not bring its own.
    pub fn global() -> &'static HitRegistry {
        &GLOBAL
    }

    /// Default converter for `Hit<B>`, created on first use.
    pub fn converter<B: HitSource>(&self) -> Result<Arc<ConcreteTypeConverter<B>>> {
        let key = TypeKey::of::<Hit<B>>();
        let erased = read_through(&self.converters, key, "converter", || {
            Arc::new(ConcreteTypeConverter::<B>::new()) as ErasedConverter
        });
        erased.downcast::<ConcreteTypeConverter<B>>().map_err(|_| {
            Error::ContractViolation(format!("converter cached for `{}` has another type", key.name()))
        })
    }

    /// Field setter for `concrete`, derived on first use.
    pub fn field_setter(&self, concrete: ConcreteType) -> Arc<dyn FieldsSetter> {
        read_through(&self.field_setters, concrete.key(), "field setter", || concrete.derive_setter())
    }

    pub fn converter_count(&self) -> usize {
        self.converters.len()
    }

    pub fn field_setter_count(&self) -> usize {
        self.field_setters.len()
    }

    pub fn has_converter<B: HitSource>(&self) -> bool {
        self.converters.contains_key(&TypeKey::of::<Hit<B>>())
    }

    pub fn has_field_setter(&self, concrete: ConcreteType) -> bool {
        self.field_setters.contains_key(&concrete.key())
    }
}

fn read_through<V: Clone>(
    cache: &DashMap<TypeKey, V>,
    key: TypeKey,
    what: &'static str,
    make: impl FnOnce() -> V,
) -> V {
    if let Some(hit) = cache.get(&key) {
        return hit.value().clone();
    }
    // Computed outside the shard lock; a racing thread may do the same work.
    let fresh = make();
    match cache.entry(key) {
        Entry::Occupied(existing) => existing.get().clone(),
        Entry::Vacant(slot) => {
            trace!(cache = what, key = key.name(), "cached");
            slot.insert(fresh).value().clone()
        }
    }
}
