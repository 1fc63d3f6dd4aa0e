//! Runtime type identity and the concrete-type handles returned by selectors.
use serde::Deserialize;
use serde_json::Value;
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use polyhit_core::HitSource;

use crate::binder::{FieldsSetter, SetFields};
use crate::hit::DynHit;
use crate::populate::RawHit;

/// Identity of a Rust type, used as the key of every cache in this crate.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>() }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The payload type a selector picked for one hit.
///
/// Created with [`ConcreteType::of`], which captures the monomorphized entry
/// points needed later: populating a `Hit<T>` from a document snapshot and
/// deriving the `SetFields<T>` binding for the field side channel.
#[derive(Clone, Copy)]
pub struct ConcreteType {
    key: TypeKey,
    populate: fn(&Value) -> serde_json::Result<DynHit>,
    derive_setter: fn() -> Arc<dyn FieldsSetter>,
}

impl ConcreteType {
    pub fn of<T: HitSource>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            populate: populate_hit::<T>,
            derive_setter: SetFields::<T>::derive,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.key.name
    }

    pub fn is<T: HitSource>(&self) -> bool {
        self.key == TypeKey::of::<T>()
    }

    pub(crate) fn populate(&self, document: &Value) -> serde_json::Result<DynHit> {
        (self.populate)(document)
    }

    pub(crate) fn derive_setter(&self) -> Arc<dyn FieldsSetter> {
        (self.derive_setter)()
    }
}

fn populate_hit<T: HitSource>(document: &Value) -> serde_json::Result<DynHit> {
    RawHit::<T>::deserialize(document).map(|RawHit(hit)| DynHit::new(hit))
}

impl PartialEq for ConcreteType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ConcreteType {}

impl fmt::Debug for ConcreteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConcreteType").field(&self.key).finish()
    }
}
