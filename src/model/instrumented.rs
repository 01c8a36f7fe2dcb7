use anyhow::Result;
use async_trait::async_trait;
use std::time::Instant;

use crate::metrics::registry::{MODEL_CALLS_TOTAL, MODEL_CALL_DURATION_SECONDS};
use crate::model::{Model, ModelDelegate, Record};
use crate::query::options::{CountOptions, QueryOptions};

/// A thin wrapper around a ModelDelegate that records Prometheus metrics
/// for call counts and durations, labelled by resource.
pub struct InstrumentedModel {
    inner: Model,
    resource: String,
}

impl InstrumentedModel {
    pub fn new(inner: Model, resource: impl Into<String>) -> Self {
        Self {
            inner,
            resource: resource.into(),
        }
    }

    fn observe(&self, operation: &'static str, start: Instant) {
        let seconds = start.elapsed().as_secs_f64();
        MODEL_CALLS_TOTAL
            .with_label_values(&[self.resource.as_str(), operation])
            .inc();
        MODEL_CALL_DURATION_SECONDS
            .with_label_values(&[self.resource.as_str(), operation])
            .observe(seconds);
    }
}

#[async_trait]
impl ModelDelegate for InstrumentedModel {
    async fn find_many(&self, options: &QueryOptions) -> Result<Vec<Record>> {
        let start = Instant::now();
        let res = self.inner.find_many(options).await;
        self.observe("find_many", start);
        res
    }

    async fn count(&self, options: &CountOptions) -> Result<u64> {
        let start = Instant::now();
        let res = self.inner.count(options).await;
        self.observe("count", start);
        res
    }
}
