use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use polyhit_core::{Error, SerializerSettings};
use polyhit_hits::{AnyHit, ConcreteType, DeserializationContext, HitRegistry, HitView};

#[derive(Debug, PartialEq, Deserialize)]
struct Base {
    kind: Option<String>,
}

#[derive(Debug, PartialEq, Deserialize)]
struct TypeA {
    v: u32,
}

#[derive(Debug, PartialEq, Deserialize)]
struct TypeB {
    v: Option<u32>,
}

fn kind_selector(source: &Value, _hit: &HitView<'_>) -> ConcreteType {
    if source["kind"] == "A" {
        ConcreteType::of::<TypeA>()
    } else {
        ConcreteType::of::<TypeB>()
    }
}

fn settings() -> Arc<SerializerSettings> {
    Arc::new(SerializerSettings::default())
}

#[test]
fn selector_picks_type_from_source() {
    polyhit_core::telemetry::init_tracing("polyhit_hits=debug");
    let registry = HitRegistry::new();
    let ctx = DeserializationContext::with_registry(settings(), &registry).selecting::<Base, _>(kind_selector);

    let doc = br#"{"_index":"i","_type":"t","_id":"1","_score":0.5,"_source":{"kind":"A","v":1}}"#;
    let hit = ctx.read_hit::<Base>(doc).expect("read").downcast::<TypeA>().expect("TypeA");

    assert_eq!(hit.index, "i");
    assert_eq!(hit.type_name, "t");
    assert_eq!(hit.id, "1");
    assert_eq!(hit.score, Some(0.5));
    assert_eq!(hit.source, Some(TypeA { v: 1 }));
    assert!(hit.fields().is_normalized());
    assert!(hit.fields().is_empty());
}

#[test]
fn selector_sees_source_synthesized_from_fields() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);
    let registry = HitRegistry::new();
    let ctx = DeserializationContext::with_registry(settings(), &registry).selecting::<Base, _>(
        move |source, hit| {
            *record.lock().unwrap() = Some(source.clone());
            assert_eq!(hit.fields.value::<String>("v").unwrap(), Some("1".to_string()));
            kind_selector(source, hit)
        },
    );

    let doc = br#"{"_index":"i","_type":"t","_id":"1","_score":0.5,"fields":{"v":["1"],"firstName":["Ada"]}}"#;
    let hit = ctx.read_hit::<Base>(doc).expect("read");

    assert_eq!(seen.lock().unwrap().clone(), Some(json!({"v": ["1"], "firstName": ["Ada"]})));
    assert!(hit.is::<TypeB>());
    assert_eq!(hit.source_as::<TypeB>(), None);
    let fields = hit.fields();
    assert!(fields.is_normalized());
    assert_eq!(fields.values::<String>("v").unwrap(), vec!["1"]);
    // looked up through the camelCase inferrer
    assert_eq!(fields.value::<String>("first_name").unwrap(), Some("Ada".to_string()));
}

#[test]
fn selector_without_source_or_fields_gets_empty_object() {
    let registry = HitRegistry::new();
    let ctx = DeserializationContext::with_registry(settings(), &registry).selecting::<Base, _>(|source, _| {
        assert_eq!(source, &json!({}));
        ConcreteType::of::<TypeB>()
    });
    let hit = ctx.read_hit::<Base>(br#"{"_index":"i","_id":"1"}"#).expect("read");
    assert!(hit.is::<TypeB>());
}

#[test]
fn selection_is_deterministic() {
    let registry = HitRegistry::new();
    let ctx = DeserializationContext::with_registry(settings(), &registry).selecting::<Base, _>(kind_selector);
    let doc = br#"{"_index":"i","_id":"2","_source":{"kind":"B","v":7},"fields":{"tag":["x","y"]}}"#;

    let first = ctx.read_hit::<Base>(doc).expect("first");
    let second = ctx.read_hit::<Base>(doc).expect("second");

    assert_eq!(first.concrete_type(), second.concrete_type());
    assert_eq!(first.fields(), second.fields());
    assert_eq!(first.source_as::<TypeB>(), second.source_as::<TypeB>());
    assert_eq!(first.source_as::<TypeB>(), Some(&TypeB { v: Some(7) }));
}

#[test]
fn view_and_materialized_hit_agree_on_coordinates() {
    let registry = HitRegistry::new();
    let seen: Arc<Mutex<Vec<(Option<String>, Option<String>, Option<f64>)>>> = Arc::default();
    let record = Arc::clone(&seen);
    let ctx = DeserializationContext::with_registry(settings(), &registry).selecting::<Base, _>(move |src, hit| {
        record.lock().unwrap().push((hit.index.map(str::to_string), hit.id.map(str::to_string), hit.score));
        kind_selector(src, hit)
    });

    let hit = ctx
        .read_hit::<Base>(br#"{"_index":"books","_id":"42","_score":1.25,"_source":{"kind":"A","v":3}}"#)
        .expect("read");

    let (index, id, score) = seen.lock().unwrap()[0].clone();
    assert_eq!(index.as_deref(), Some(hit.index()));
    assert_eq!(id.as_deref(), Some(hit.id()));
    assert_eq!(score, hit.score());
}

#[test]
fn view_resolves_member_names_like_the_materializer() {
    let registry = HitRegistry::new();
    let seen: Arc<Mutex<Option<(Option<String>, Option<String>)>>> = Arc::default();
    let record = Arc::clone(&seen);
    let ctx = DeserializationContext::with_registry(settings(), &registry).selecting::<Base, _>(move |src, hit| {
        *record.lock().unwrap() = Some((hit.index.map(str::to_string), hit.id.map(str::to_string)));
        kind_selector(src, hit)
    });

    let hit = ctx
        .read_hit::<Base>(br#"{"_index":"a","Index":"b","ID":"7","_source":{"kind":"A","v":1}}"#)
        .expect("read");

    assert_eq!((hit.index(), hit.id()), ("b", "7"));
    assert_eq!(seen.lock().unwrap().clone(), Some((Some("b".to_string()), Some("7".to_string()))));
}

#[test]
fn selector_may_return_any_type() {
    let registry = HitRegistry::new();
    let ctx = DeserializationContext::with_registry(settings(), &registry)
        .selecting::<Base, _>(|_, _| ConcreteType::of::<Value>());
    let hit = ctx.read_hit::<Base>(br#"{"_id":"1","_source":{"anything":[1,2]}}"#).expect("read");
    assert_eq!(hit.source_as::<Value>(), Some(&json!({"anything": [1, 2]})));
}

#[test]
fn mismatched_choice_is_a_materialization_failure() {
    let registry = HitRegistry::new();
    let ctx = DeserializationContext::with_registry(settings(), &registry).selecting::<Base, _>(kind_selector);
    let err = ctx
        .read_hit::<Base>(br#"{"_id":"1","_source":{"kind":"A","v":"one"}}"#)
        .unwrap_err();
    match err {
        Error::MaterializationFailure { type_name, fragment, .. } => {
            assert!(type_name.ends_with("TypeA"), "got {type_name}");
            assert!(fragment.contains("\"v\":\"one\""));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unbinding_restores_the_declared_type() {
    let registry = HitRegistry::new();
    let mut ctx = DeserializationContext::with_registry(settings(), &registry);
    ctx.bind_selector::<Base, _>(kind_selector);
    let doc = br#"{"_id":"1","_source":{"kind":"A","v":1}}"#;
    assert!(ctx.read_hit::<Base>(doc).expect("selected").is::<TypeA>());
    assert!(ctx.stateful_converter::<Base>().is_some());

    assert!(ctx.unbind::<Base>());
    assert!(ctx.stateful_converter::<Base>().is_none());
    let hit = ctx.read_hit::<Base>(doc).expect("declared").downcast::<Base>().expect("Base");
    assert_eq!(hit.source, Some(Base { kind: Some("A".into()) }));
}

#[test]
fn rebinding_replaces_the_selector() {
    let registry = HitRegistry::new();
    let mut ctx = DeserializationContext::with_registry(settings(), &registry);
    ctx.bind_selector::<Base, _>(|_, _| ConcreteType::of::<TypeA>())
        .bind_selector::<Base, _>(|_, _| ConcreteType::of::<TypeB>());
    let hit = ctx.read_hit::<Base>(br#"{"_id":"1","_source":{"v":1}}"#).expect("read");
    assert!(hit.is::<TypeB>());
}
