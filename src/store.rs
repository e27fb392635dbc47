use crate::{error::Result, model::Flow};
use async_trait::async_trait;

/// Storage capability for aggregated flows. The HTTP layer only ever talks to this trait.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Adds every flow in the batch to the running totals of its key. The batch is applied as a
    /// whole or not at all. Ordering within the batch does not affect the result.
    async fn merge(&self, flows: &[Flow]) -> Result<()>;

    /// Snapshot of every aggregate, in no particular order.
    async fn query_all(&self) -> Result<Vec<Flow>>;

    /// Snapshot of the aggregates for the given hour. Empty if nothing matches.
    async fn query_by_hour(&self, hour: u64) -> Result<Vec<Flow>>;
}
