//! Field-name inference.
//!
//! Callers ask for fields by the name they use in their own types; the
//! inferrer maps that onto the name the search engine stores. Lookups through
//! [`crate::fields::FieldValues`] always go through the active inferrer.
use heck::{ToLowerCamelCase, ToSnakeCase};
use serde::{Deserialize, Serialize};

use crate::traits::FieldInferrer;

/// Naming convention applied by [`NamingInferrer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNaming {
    AsIs,
    #[default]
    CamelCase,
    SnakeCase,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NamingInferrer {
    naming: FieldNaming,
}

impl NamingInferrer {
    pub fn new(naming: FieldNaming) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> FieldNaming {
        self.naming
    }
}

impl FieldInferrer for NamingInferrer {
    fn infer(&self, name: &str) -> String {
        match self.naming {
            FieldNaming::AsIs => name.to_string(),
            FieldNaming::CamelCase => per_segment(name, <str as ToLowerCamelCase>::to_lower_camel_case),
            FieldNaming::SnakeCase => per_segment(name, <str as ToSnakeCase>::to_snake_case),
        }
    }
}

// Dotted paths ("author.first_name") are converted segment by segment.
fn per_segment(name: &str, convert: fn(&str) -> String) -> String {
    name.split('.').map(convert).collect::<Vec<_>>().join(".")
}
