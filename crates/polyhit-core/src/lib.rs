#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! polyhit-core
//!
//! Shared building blocks for hit deserialization: the error taxonomy,
//! configuration, serializer settings, field-name inference and the value
//! types hits are made of.

pub mod config;
pub mod error;
pub mod fields;
pub mod inferrer;
pub mod settings;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use fields::FieldValues;
pub use inferrer::{FieldNaming, NamingInferrer};
pub use settings::{SerializerOptions, SerializerSettings};
pub use traits::{FieldInferrer, HitSource};
pub use types::{Explanation, Highlight, ShardStatistics, TotalHits, TotalRelation};
