pub mod delegate;
pub mod instrumented;
pub mod memory;
pub mod registry;

use anyhow::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

pub use delegate::ModelDelegate;
pub use instrumented::InstrumentedModel;
pub use memory::MemoryModel;
pub use registry::{Resource, ResourceRegistry};

/// One entity as returned by a model; its shape follows the selection.
pub type Record = Map<String, Value>;

/// Model handle shared across requests
pub type Model = Arc<dyn ModelDelegate>;

/// Load the resources served by the API
pub fn init_registry(config: &crate::config::DataConfig) -> Result<ResourceRegistry> {
    tracing::info!("Loading dataset from {}", config.dataset_path.display());
    let registry = ResourceRegistry::load_dataset(&config.dataset_path)?;
    tracing::info!("Loaded {} resources", registry.len());
    Ok(registry)
}
