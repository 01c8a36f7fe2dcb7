use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::metrics::registry::{RECORDS_LOADED, RESOURCES_REGISTERED};
use crate::model::{InstrumentedModel, MemoryModel, Model, Record};

/// A model exposed over the API together with its query metadata
#[derive(Clone)]
pub struct Resource {
    pub name: String,
    pub model: Model,
    /// Known attribute names, used when `exclude` builds a selection
    pub fields: Vec<String>,
    /// Attributes matched by `searchTerm`
    pub searchable_fields: Vec<String>,
}

/// One resource entry of a dataset file
#[derive(Debug, Deserialize)]
struct ResourceSpec {
    #[serde(default)]
    fields: Option<Vec<String>>,
    #[serde(default)]
    searchable_fields: Vec<String>,
    records: Vec<Record>,
}

#[derive(Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, Resource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource: Resource) {
        self.resources.insert(resource.name.clone(), resource);
        RESOURCES_REGISTERED.set(self.resources.len() as i64);
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Build a registry from a dataset document:
    /// `{"<resource>": {"fields"?, "searchable_fields"?, "records": [...]}}`.
    ///
    /// Every resource is served by an instrumented in-memory model. When
    /// `fields` is omitted it defaults to the union of record keys.
    pub fn from_dataset(dataset: Value) -> Result<Self> {
        let specs: BTreeMap<String, ResourceSpec> =
            serde_json::from_value(dataset).context("Invalid dataset document")?;

        let mut registry = Self::new();
        for (name, spec) in specs {
            let record_count = spec.records.len();
            let memory = MemoryModel::new(spec.records);
            let fields = spec.fields.unwrap_or_else(|| memory.field_names());
            let model: Model = Arc::new(InstrumentedModel::new(Arc::new(memory), name.clone()));

            RECORDS_LOADED
                .with_label_values(&[name.as_str()])
                .set(record_count as i64);
            info!(
                resource = %name,
                records = record_count,
                fields = fields.len(),
                "Registered resource"
            );

            registry.register(Resource {
                name,
                model,
                fields,
                searchable_fields: spec.searchable_fields,
            });
        }

        Ok(registry)
    }

    /// Read a dataset file from disk
    pub fn load_dataset(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file {}", path.display()))?;
        let dataset: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse dataset file {}", path.display()))?;
        Self::from_dataset(dataset)
    }
}
