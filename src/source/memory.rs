use std::collections::BTreeMap;

use super::{parse, DocumentSource};
use crate::error::LoadError;
use crate::models::Document;

/// In-memory documents, kept as raw JSON so parse failures can be staged too.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    root: Option<String>,
    provinces: BTreeMap<String, String>,
    /// BTreeMap keeps county keys sorted, matching the directory scan order
    counties: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, json: impl Into<String>) -> Self {
        self.root = Some(json.into());
        self
    }

    pub fn with_province(mut self, code: impl Into<String>, json: impl Into<String>) -> Self {
        self.provinces.insert(code.into(), json.into());
        self
    }

    pub fn with_county(mut self, key: impl Into<String>, json: impl Into<String>) -> Self {
        self.counties.insert(key.into(), json.into());
        self
    }
}

impl DocumentSource for MemorySource {
    fn root(&self) -> Result<Document, LoadError> {
        match &self.root {
            Some(json) => parse("root", json.as_bytes()),
            None => Err(LoadError::missing("root")),
        }
    }

    fn province(&self, code: &str) -> Result<Document, LoadError> {
        match self.provinces.get(code) {
            Some(json) => parse(code, json.as_bytes()),
            None => Err(LoadError::missing(code)),
        }
    }

    fn county_keys(&self, prefix: &str) -> Vec<String> {
        self.counties
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn county(&self, key: &str) -> Result<Document, LoadError> {
        match self.counties.get(key) {
            Some(json) => parse(key, json.as_bytes()),
            None => Err(LoadError::missing(key)),
        }
    }
}
