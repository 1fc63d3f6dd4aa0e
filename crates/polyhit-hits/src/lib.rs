#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! polyhit-hits
//!
//! Polymorphic search-hit deserialization. A response is read through a
//! [`DeserializationContext`]; for a base type with no selector bound, hits
//! come out as `Hit<B>`. With a selector bound, each hit's document is
//! snapshotted, shown to the selector, and materialized as `Hit<T>` for
//! whichever concrete `T` the selector picked.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use serde::Deserialize;
//! # use polyhit_core::SerializerSettings;
//! # use polyhit_hits::{ConcreteType, DeserializationContext};
//! #[derive(Debug, Deserialize)] struct Doc;
//! #[derive(Debug, Deserialize)] struct Page { title: String }
//! #[derive(Debug, Deserialize)] struct Person { name: String }
//!
//! # fn main() -> polyhit_core::Result<()> {
//! # let body = b"{}";
//! let ctx = DeserializationContext::new(Arc::new(SerializerSettings::default()))
//!     .selecting::<Doc, _>(|source, _hit| match source["kind"].as_str() {
//!         Some("page") => ConcreteType::of::<Page>(),
//!         _ => ConcreteType::of::<Person>(),
//!     });
//! let response = ctx.read_response::<Doc>(body)?;
//! for page in response.documents::<Page>() {
//!     println!("{}", page.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod binder;
pub mod concrete;
pub mod context;
pub mod converter;
pub mod hit;
pub mod materialize;
mod populate;
pub mod registry;
pub mod response;
pub mod selection;
pub mod snapshot;

pub use binder::{FieldsSetter, SetFields};
pub use concrete::{ConcreteType, TypeKey};
pub use context::DeserializationContext;
pub use converter::ConcreteTypeConverter;
pub use hit::{AnyHit, DynHit, Hit};
pub use registry::HitRegistry;
pub use response::{HitSeed, HitsSeed, SearchResponse, SearchResponseSeed};
pub use selection::{HitView, Selector};
pub use snapshot::DocumentSnapshot;
