use anyhow::Result;
use async_trait::async_trait;

use crate::model::Record;
use crate::query::options::{CountOptions, QueryOptions};

/// Data-access handle for one model.
///
/// Implementations own filtering, ordering and projection; the query builder
/// only shapes the options it passes in.
#[async_trait]
pub trait ModelDelegate: Send + Sync {
    /// List records matching `options`
    async fn find_many(&self, options: &QueryOptions) -> Result<Vec<Record>>;

    /// Count records matching the predicate in `options`
    async fn count(&self, options: &CountOptions) -> Result<u64>;
}
