//! Serializer settings read by the hit deserialization engine.
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::inferrer::{FieldNaming, NamingInferrer};
use crate::traits::FieldInferrer;

pub const DEFAULT_ERROR_FRAGMENT_LIMIT: usize = 256;

/// The `[serializer]` table of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    pub field_naming: FieldNaming,
    /// Upper bound, in bytes, on the document excerpt carried by errors.
    pub error_fragment_limit: usize,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self { field_naming: FieldNaming::default(), error_fragment_limit: DEFAULT_ERROR_FRAGMENT_LIMIT }
    }
}

impl SerializerOptions {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.get_or_default("serializer")
    }
}

#[derive(Debug, Clone)]
pub struct SerializerSettings {
    inferrer: Arc<dyn FieldInferrer>,
    error_fragment_limit: usize,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            inferrer: Arc::new(NamingInferrer::default()),
            error_fragment_limit: DEFAULT_ERROR_FRAGMENT_LIMIT,
        }
    }
}

impl SerializerSettings {
    pub fn from_options(options: &SerializerOptions) -> Result<Self> {
        if options.error_fragment_limit == 0 {
            return Err(Error::InvalidConfig("serializer.error_fragment_limit must be positive".into()));
        }
        Ok(Self {
            inferrer: Arc::new(NamingInferrer::new(options.field_naming)),
            error_fragment_limit: options.error_fragment_limit,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let options = SerializerOptions::from_config(config).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Self::from_options(&options)
    }

    pub fn with_inferrer(mut self, inferrer: Arc<dyn FieldInferrer>) -> Self {
        self.inferrer = inferrer;
        self
    }

    pub fn inferrer(&self) -> &Arc<dyn FieldInferrer> {
        &self.inferrer
    }

    pub fn error_fragment_limit(&self) -> usize {
        self.error_fragment_limit
    }
}
