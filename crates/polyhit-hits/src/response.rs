//! Seeds that thread a [`DeserializationContext`] through a response body.
//!
//! Hits are deserialized one at a time as the parser reaches them, in
//! document order.
use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use std::fmt;

use polyhit_core::{HitSource, ShardStatistics, TotalHits};

use crate::context::DeserializationContext;
use crate::converter::ConcreteTypeConverter;
use crate::hit::{DynHit, Hit};

/// One hit.
pub struct HitSeed<'a, 'r, B> {
    ctx: &'a DeserializationContext<'r>,
    converter: &'a ConcreteTypeConverter<B>,
}

impl<'a, 'r, B> HitSeed<'a, 'r, B> {
    pub fn new(ctx: &'a DeserializationContext<'r>, converter: &'a ConcreteTypeConverter<B>) -> Self {
        Self { ctx, converter }
    }
}

impl<B> Clone for HitSeed<'_, '_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for HitSeed<'_, '_, B> {}

impl<'de, B: HitSource> DeserializeSeed<'de> for HitSeed<'_, '_, B> {
    type Value = DynHit;

    fn deserialize<D>(self, deserializer: D) -> Result<DynHit, D::Error>
    where
        D: Deserializer<'de>,
    {
        self.converter.read(deserializer, self.ctx)
    }
}

/// A JSON array of hits.
pub struct HitsSeed<'a, 'r, B> {
    hit: HitSeed<'a, 'r, B>,
}

impl<'a, 'r, B> HitsSeed<'a, 'r, B> {
    pub fn new(ctx: &'a DeserializationContext<'r>, converter: &'a ConcreteTypeConverter<B>) -> Self {
        Self { hit: HitSeed::new(ctx, converter) }
    }
}

impl<'de, B: HitSource> DeserializeSeed<'de> for HitsSeed<'_, '_, B> {
    type Value = Vec<DynHit>;

    fn deserialize<D>(self, deserializer: D) -> Result<Vec<DynHit>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, B: HitSource> Visitor<'de> for HitsSeed<'_, '_, B> {
    type Value = Vec<DynHit>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of hits")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Vec<DynHit>, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut hits = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(hit) = seq.next_element_seed(self.hit)? {
            hits.push(hit);
        }
        Ok(hits)
    }
}

/// A decoded search response.
#[derive(Debug, Default)]
pub struct SearchResponse {
    pub took: Option<u64>,
    pub timed_out: bool,
    pub shards: Option<ShardStatistics>,
    pub total: Option<TotalHits>,
    pub max_score: Option<f64>,
    pub hits: Vec<DynHit>,
}

impl SearchResponse {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits whose payload type is `T`, in response order.
    pub fn hits_of<T: HitSource>(&self) -> impl Iterator<Item = &Hit<T>> {
        self.hits.iter().filter_map(DynHit::downcast_ref::<T>)
    }

    /// Sources of the hits whose payload type is `T`.
    pub fn documents<T: HitSource>(&self) -> impl Iterator<Item = &T> {
        self.hits_of::<T>().filter_map(Hit::source)
    }

    /// All hits as `Hit<T>`; gives back the first hit of another type.
    pub fn into_hits<T: HitSource>(self) -> Result<Vec<Hit<T>>, DynHit> {
        self.hits.into_iter().map(DynHit::downcast::<T>).collect()
    }
}

/// A full search response body.
pub struct SearchResponseSeed<'a, 'r, B> {
    hit: HitSeed<'a, 'r, B>,
}

impl<'a, 'r, B> SearchResponseSeed<'a, 'r, B> {
    pub fn new(ctx: &'a DeserializationContext<'r>, converter: &'a ConcreteTypeConverter<B>) -> Self {
        Self { hit: HitSeed::new(ctx, converter) }
    }
}

impl<'de, B: HitSource> DeserializeSeed<'de> for SearchResponseSeed<'_, '_, B> {
    type Value = SearchResponse;

    fn deserialize<D>(self, deserializer: D) -> Result<SearchResponse, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, B: HitSource> Visitor<'de> for SearchResponseSeed<'_, '_, B> {
    type Value = SearchResponse;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a search response object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<SearchResponse, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut response = SearchResponse::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "took" => response.took = map.next_value()?,
                "timed_out" => response.timed_out = map.next_value::<Option<bool>>()?.unwrap_or_default(),
                "_shards" => response.shards = map.next_value()?,
                "hits" => {
                    let section = map.next_value_seed(HitsSection { hit: self.hit })?;
                    response.total = section.total;
                    response.max_score = section.max_score;
                    response.hits = section.hits;
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(response)
    }
}

#[derive(Default)]
struct HitsSectionValue {
    total: Option<TotalHits>,
    max_score: Option<f64>,
    hits: Vec<DynHit>,
}

/// The `hits` object: `total`, `max_score` and the `hits` array.
struct HitsSection<'a, 'r, B> {
    hit: HitSeed<'a, 'r, B>,
}

impl<'de, B: HitSource> DeserializeSeed<'de> for HitsSection<'_, '_, B> {
    type Value = HitsSectionValue;

    fn deserialize<D>(self, deserializer: D) -> Result<HitsSectionValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, B: HitSource> Visitor<'de> for HitsSection<'_, '_, B> {
    type Value = HitsSectionValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a hits section object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<HitsSectionValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut section = HitsSectionValue::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "total" => section.total = map.next_value()?,
                "max_score" => section.max_score = map.next_value()?,
                "hits" => section.hits = map.next_value_seed(HitsSeed { hit: self.hit })?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(section)
    }
}
