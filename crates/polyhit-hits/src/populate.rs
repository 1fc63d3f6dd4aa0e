//! Structural population of `Hit<T>` from any serde data source.
//!
//! Field names are matched ignoring case and underscores, so `_index`,
//! `Index` and `index` all land in [`Hit::index`]; a later member overwrites
//! an earlier one that maps to the same slot. Unknown members are skipped.
//! The `fields` section is stored raw; normalizing it is the binder's job,
//! so nothing here is public. Callers get hits from a
//! [`crate::DeserializationContext`] only.
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

use polyhit_core::FieldValues;

use crate::hit::Hit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HitField {
    Index,
    Type,
    Id,
    Score,
    Version,
    Source,
    Fields,
    Sorts,
    Highlight,
    Explanation,
    Other,
}

impl HitField {
    pub(crate) fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "index" => HitField::Index,
            "type" => HitField::Type,
            "id" => HitField::Id,
            "score" => HitField::Score,
            "version" => HitField::Version,
            "source" => HitField::Source,
            "fields" => HitField::Fields,
            "sort" | "sorts" => HitField::Sorts,
            "highlight" | "highlights" => HitField::Highlight,
            "explanation" => HitField::Explanation,
            _ => HitField::Other,
        }
    }
}

impl<'de> Deserialize<'de> for HitField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldVisitor;

        impl<'de> Visitor<'de> for FieldVisitor {
            type Value = HitField;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hit member name")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<HitField, E> {
                Ok(HitField::from_name(v))
            }
        }

        deserializer.deserialize_identifier(FieldVisitor)
    }
}

/// A `Hit<T>` straight out of the populator, `fields` not yet bound.
pub(crate) struct RawHit<T>(pub(crate) Hit<T>);

impl<'de, T> Deserialize<'de> for RawHit<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(HitVisitor::new()).map(RawHit)
    }
}

pub(crate) struct HitVisitor<T>(PhantomData<fn() -> T>);

impl<T> HitVisitor<T> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'de, T> Visitor<'de> for HitVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = Hit<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a search hit object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Hit<T>, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut hit = Hit::default();
        while let Some(field) = map.next_key::<HitField>()? {
            match field {
                HitField::Index => hit.index = map.next_value::<Option<String>>()?.unwrap_or_default(),
                HitField::Type => hit.type_name = map.next_value::<Option<String>>()?.unwrap_or_default(),
                HitField::Id => hit.id = map.next_value::<Option<String>>()?.unwrap_or_default(),
                HitField::Score => hit.score = map.next_value()?,
                HitField::Version => hit.version = map.next_value()?,
                HitField::Source => hit.source = map.next_value()?,
                HitField::Fields => {
                    let raw = map.next_value::<Option<Map<String, Value>>>()?;
                    hit.fields = FieldValues::raw(raw.unwrap_or_default());
                }
                HitField::Sorts => hit.sorts = map.next_value()?,
                HitField::Highlight => hit.highlight = map.next_value()?,
                HitField::Explanation => hit.explanation = map.next_value()?,
                HitField::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(hit)
    }
}
