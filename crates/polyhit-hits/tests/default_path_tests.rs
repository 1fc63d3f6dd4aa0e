use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use polyhit_core::{Error, FieldNaming, NamingInferrer, SerializerSettings};
use polyhit_hits::{AnyHit, DeserializationContext, DocumentSnapshot, HitRegistry};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    tags: Vec<String>,
}

const FULL_HIT: &str = r#"{
    "_index": "pages",
    "_type": "page",
    "_id": "p-1",
    "_score": 2.5,
    "_version": 4,
    "_source": {"title": "Rust", "tags": ["lang"]},
    "fields": {"wordCount": [1200]},
    "sort": [2.5, "p-1"],
    "highlight": {"title": ["<em>Rust</em>"]},
    "_explanation": {"value": 2.5, "description": "sum of", "details": []}
}"#;

fn context(registry: &HitRegistry) -> DeserializationContext<'_> {
    DeserializationContext::with_registry(Arc::new(SerializerSettings::default()), registry)
}

#[test]
fn declared_path_reads_every_member() -> Result<()> {
    let registry = HitRegistry::new();
    let ctx = context(&registry);

    let hit = ctx
        .read_hit::<Page>(FULL_HIT.as_bytes())?
        .downcast::<Page>()
        .map_err(|other| anyhow::anyhow!("unexpected payload {}", other.concrete_type().name()))?;

    assert_eq!((hit.index.as_str(), hit.type_name.as_str(), hit.id.as_str()), ("pages", "page", "p-1"));
    assert_eq!(hit.score, Some(2.5));
    assert_eq!(hit.source, Some(Page { title: "Rust".into(), tags: vec!["lang".into()] }));
    assert!(hit.fields().is_normalized());
    assert_eq!(hit.version, Some(4));
    assert_eq!(hit.sorts, Some(vec![serde_json::json!(2.5), serde_json::json!("p-1")]));
    assert_eq!(hit.highlight, Some(HashMap::from([("title".to_string(), vec!["<em>Rust</em>".to_string()])])));
    assert_eq!(hit.explanation.as_ref().map(|e| e.description.as_str()), Some("sum of"));
    assert_eq!(hit.fields().value::<u32>("word_count")?, Some(1200));
    Ok(())
}

#[test]
fn declared_path_does_not_touch_the_setter_cache() -> Result<()> {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    for _ in 0..3 {
        ctx.read_hit::<Page>(FULL_HIT.as_bytes())?;
    }
    assert_eq!(registry.converter_count(), 1);
    assert_eq!(registry.field_setter_count(), 0);
    Ok(())
}

#[test]
fn missing_fields_become_empty_normalized_values() -> Result<()> {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    let hit = ctx.read_hit::<Page>(br#"{"_index":"pages","_id":"1","_source":{"title":"x"}}"#)?;
    assert!(hit.fields().is_normalized());
    assert!(hit.fields().is_empty());
    Ok(())
}

#[test]
fn member_names_match_loosely() -> Result<()> {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    let hit = ctx.read_hit::<Page>(br#"{"_INDEX":"pages","Id":"7","_Score":1.0,"_source":{"title":"x"},"_routing":"r"}"#)?;
    assert_eq!(hit.index(), "pages");
    assert_eq!(hit.id(), "7");
    assert_eq!(hit.score(), Some(1.0));
    Ok(())
}

#[test]
fn null_coordinates_read_as_empty() -> Result<()> {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    let hit = ctx.read_hit::<Page>(br#"{"_index":null,"_id":null,"_score":null}"#)?;
    assert_eq!(hit.index(), "");
    assert_eq!(hit.id(), "");
    assert_eq!(hit.score(), None);
    assert!(hit.source_as::<Page>().is_none());
    Ok(())
}

#[test]
fn as_is_naming_keeps_lookups_exact() -> Result<()> {
    let registry = HitRegistry::new();
    let settings = SerializerSettings::default().with_inferrer(Arc::new(NamingInferrer::new(FieldNaming::AsIs)));
    let ctx = DeserializationContext::with_registry(Arc::new(settings), &registry);
    let hit = ctx.read_hit::<Page>(FULL_HIT.as_bytes())?;
    assert_eq!(hit.fields().value::<u32>("wordCount")?, Some(1200));
    assert_eq!(hit.fields().value::<u32>("word_count")?, None);
    Ok(())
}

#[test]
fn snapshot_reads_replay_the_same_document() -> Result<()> {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    let snapshot = DocumentSnapshot::from_slice(FULL_HIT.as_bytes())?;
    let first = ctx.read_snapshot::<Page>(&snapshot)?;
    let second = ctx.read_snapshot::<Page>(&snapshot)?;
    assert_eq!(first.downcast_ref::<Page>(), second.downcast_ref::<Page>());
    Ok(())
}

#[test]
fn non_object_hit_is_malformed() {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    let err = ctx.read_hit::<Page>(b"[1, 2]").unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)), "got {err:?}");
}

#[test]
fn truncated_hit_is_malformed() {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    let err = ctx.read_hit::<Page>(br#"{"_index":"pages","_source":{"title""#).unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)), "got {err:?}");
}

#[test]
fn declared_source_mismatch_surfaces_the_populator_error() {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    let err = ctx.read_hit::<Page>(br#"{"_id":"1","_source":{"title":5}}"#).unwrap_err();
    assert!(matches!(err, Error::Json(_)), "got {err:?}");
}

#[test]
fn snapshot_source_mismatch_is_a_materialization_failure() {
    let registry = HitRegistry::new();
    let ctx = context(&registry);
    let snapshot = DocumentSnapshot::from_slice(br#"{"_id":"1","_source":{"title":5}}"#).unwrap();
    match ctx.read_snapshot::<Page>(&snapshot).unwrap_err() {
        Error::MaterializationFailure { type_name, .. } => assert!(type_name.ends_with("Page"), "got {type_name}"),
        other => panic!("unexpected error: {other:?}"),
    }
}
