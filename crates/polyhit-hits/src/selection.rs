//! Loose metadata view of a hit and concrete-type selection.
//!
//! Nothing read here is required: a member that is missing, `null`, or of an
//! unexpected shape is treated as absent. Only the materializer is strict.
use serde::Deserialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, warn};

use polyhit_core::{Explanation, FieldInferrer, FieldValues, Highlight, SerializerSettings};

use crate::concrete::{ConcreteType, TypeKey};
use crate::populate::HitField;
use crate::snapshot::DocumentSnapshot;

/// User callback picking the payload type of one hit.
///
/// Receives the source payload (see [`HitView::source_payload`]) and the
/// metadata view of the hit.
pub type Selector = dyn Fn(&Value, &HitView<'_>) -> ConcreteType + Send + Sync;

/// What a selector gets to see of a hit before its type is known.
#[derive(Debug, Clone)]
pub struct HitView<'a> {
    pub index: Option<&'a str>,
    pub type_name: Option<&'a str>,
    pub id: Option<&'a str>,
    pub score: Option<f64>,
    pub version: Option<i64>,
    pub sorts: Option<&'a [Value]>,
    pub highlight: Option<Highlight>,
    pub explanation: Option<Explanation>,
    /// The `_source` member, when present and not `null`.
    pub source: Option<&'a Value>,
    pub fields: FieldValues,
    has_fields: bool,
}

impl<'a> HitView<'a> {
    pub fn from_snapshot(snapshot: &'a DocumentSnapshot, inferrer: &Arc<dyn FieldInferrer>) -> Self {
        let members = Members::locate(snapshot);
        let (fields, has_fields) = match members.fields {
            Some(Value::Object(map)) => (map.clone(), true),
            None | Some(Value::Null) => (Map::new(), false),
            Some(_) => {
                warn!(member = "fields", "unexpected shape, treating as absent");
                (Map::new(), false)
            }
        };

        Self {
            index: loose("_index", members.index, Value::as_str),
            type_name: loose("_type", members.type_name, Value::as_str),
            id: loose("_id", members.id, Value::as_str),
            score: loose("_score", members.score, Value::as_f64),
            version: loose("_version", members.version, Value::as_i64),
            sorts: loose("sort", members.sorts, |v| v.as_array().map(Vec::as_slice)),
            highlight: loose("highlight", members.highlight, |v| Highlight::deserialize(v).ok()),
            explanation: loose("_explanation", members.explanation, |v| Explanation::deserialize(v).ok()),
            source: members.source.filter(|v| !v.is_null()),
            fields: FieldValues::new(Arc::clone(inferrer), fields),
            has_fields,
        }
    }

    /// `_source` if the hit has one; otherwise an object built from the
    /// requested field values; otherwise an empty object.
    pub fn source_payload(&self) -> Cow<'a, Value> {
        match self.source {
            Some(source) => Cow::Borrowed(source),
            None if self.has_fields => Cow::Owned(self.fields.to_dynamic()),
            None => Cow::Owned(Value::Object(Map::new())),
        }
    }
}

/// Hit members found under the populator's naming rule: case and
/// underscores are ignored, the last member for a slot wins.
#[derive(Default)]
struct Members<'a> {
    index: Option<&'a Value>,
    type_name: Option<&'a Value>,
    id: Option<&'a Value>,
    score: Option<&'a Value>,
    version: Option<&'a Value>,
    source: Option<&'a Value>,
    fields: Option<&'a Value>,
    sorts: Option<&'a Value>,
    highlight: Option<&'a Value>,
    explanation: Option<&'a Value>,
}

impl<'a> Members<'a> {
    fn locate(snapshot: &'a DocumentSnapshot) -> Self {
        let mut members = Self::default();
        for (name, value) in snapshot.as_map() {
            let slot = match HitField::from_name(name) {
                HitField::Index => &mut members.index,
                HitField::Type => &mut members.type_name,
                HitField::Id => &mut members.id,
                HitField::Score => &mut members.score,
                HitField::Version => &mut members.version,
                HitField::Source => &mut members.source,
                HitField::Fields => &mut members.fields,
                HitField::Sorts => &mut members.sorts,
                HitField::Highlight => &mut members.highlight,
                HitField::Explanation => &mut members.explanation,
                HitField::Other => continue,
            };
            *slot = Some(value);
        }
        members
    }
}

fn loose<'a, T>(
    member: &'static str,
    value: Option<&'a Value>,
    extract: impl FnOnce(&'a Value) -> Option<T>,
) -> Option<T> {
    let value = value.filter(|v| !v.is_null())?;
    let extracted = extract(value);
    if extracted.is_none() {
        warn!(member, "unexpected shape, treating as absent");
    }
    extracted
}

/// Run `selector` over `snapshot` and return its choice with the view it saw.
///
/// The returned type is not validated; a payload that does not fit it fails
/// later, during materialization.
pub fn select<'a>(
    snapshot: &'a DocumentSnapshot,
    base_type: TypeKey,
    selector: &Selector,
    settings: &SerializerSettings,
) -> (ConcreteType, HitView<'a>) {
    let view = HitView::from_snapshot(snapshot, settings.inferrer());
    let payload = view.source_payload();
    let concrete = selector(&*payload, &view);
    debug!(
        base = base_type.name(),
        concrete = concrete.name(),
        id = view.id.unwrap_or_default(),
        "selected concrete hit type"
    );
    (concrete, view)
}
