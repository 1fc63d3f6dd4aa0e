//! Wire-level value types shared by hits and responses.

use serde::Deserialize;
use std::collections::HashMap;

/// Highlighted fragments per field name.
pub type Highlight = HashMap<String, Vec<String>>;

/// Score explanation tree (`_explanation`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Explanation {
    pub value: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: Vec<Explanation>,
}

/// `_shards` section of a search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShardStatistics {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
}

/// `hits.total`, which older engines send as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Tracked {
        value: u64,
        #[serde(default)]
        relation: TotalRelation,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalRelation {
    #[default]
    Eq,
    Gte,
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match *self {
            TotalHits::Count(v) | TotalHits::Tracked { value: v, .. } => v,
        }
    }

    pub fn is_lower_bound(&self) -> bool {
        matches!(self, TotalHits::Tracked { relation: TotalRelation::Gte, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn total_accepts_both_shapes() {
        let bare: TotalHits = serde_json::from_value(json!(12)).unwrap();
        assert_eq!(bare.value(), 12);
        let tracked: TotalHits = serde_json::from_value(json!({"value": 10000, "relation": "gte"})).unwrap();
        assert_eq!(tracked.value(), 10000);
        assert!(tracked.is_lower_bound());
    }

    #[test]
    fn explanation_nests() {
        let e: Explanation = serde_json::from_value(json!({
            "value": 1.5,
            "description": "sum of:",
            "details": [{"value": 1.0, "description": "weight"}, {"value": 0.5, "description": "boost"}]
        }))
        .unwrap();
        assert_eq!(e.details.len(), 2);
        assert!(e.details[1].details.is_empty());
    }
}
