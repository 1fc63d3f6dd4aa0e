//! Wrapper materializer: builds `Hit<T>` by replaying a document snapshot.
use tracing::debug;

use polyhit_core::{Error, HitSource, Result, SerializerSettings};

use crate::concrete::ConcreteType;
use crate::hit::{DynHit, Hit};
use crate::populate::RawHit;
use crate::snapshot::DocumentSnapshot;

/// Populate a hit of the runtime-chosen `concrete` type from `snapshot`.
pub fn materialize(
    concrete: ConcreteType,
    snapshot: &DocumentSnapshot,
    settings: &SerializerSettings,
) -> Result<DynHit> {
    let hit = concrete
        .populate(snapshot.reader())
        .map_err(|e| failure(concrete.name(), &e, snapshot, settings))?;
    debug!(concrete = concrete.name(), id = hit.id(), "materialized hit");
    Ok(hit)
}

/// Populate a hit of the statically declared type `T`.
pub fn materialize_declared<T: HitSource>(
    snapshot: &DocumentSnapshot,
    settings: &SerializerSettings,
) -> Result<Hit<T>> {
    <RawHit<T> as serde::Deserialize>::deserialize(snapshot.reader())
        .map(|RawHit(hit)| hit)
        .map_err(|e| failure(std::any::type_name::<T>(), &e, snapshot, settings))
}

fn failure(
    type_name: &'static str,
    cause: &serde_json::Error,
    snapshot: &DocumentSnapshot,
    settings: &SerializerSettings,
) -> Error {
    Error::MaterializationFailure {
        type_name,
        reason: cause.to_string(),
        fragment: snapshot.fragment(settings.error_fragment_limit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct TypeA {
        v: u32,
    }

    #[test]
    fn materializes_chosen_type() {
        let snap = DocumentSnapshot::from_value(json!({"_id": "1", "_source": {"v": 1}})).unwrap();
        let hit = materialize(ConcreteType::of::<TypeA>(), &snap, &SerializerSettings::default()).unwrap();
        assert_eq!(hit.source_as::<TypeA>(), Some(&TypeA { v: 1 }));
    }

    #[test]
    fn mismatch_reports_type_and_fragment() {
        let snap = DocumentSnapshot::from_value(json!({"_id": "9", "_source": {"v": "x"}})).unwrap();
        let err = materialize(ConcreteType::of::<TypeA>(), &snap, &SerializerSettings::default()).unwrap_err();
        match err {
            Error::MaterializationFailure { type_name, fragment, .. } => {
                assert!(type_name.ends_with("TypeA"));
                assert!(fragment.contains("\"_id\":\"9\""));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
