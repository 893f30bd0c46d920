use async_trait::async_trait;

use crate::projection::ProjectionNode;

/// The asynchronous boundary to the backing data engine. The projection's
/// root name is always the model's underlying name by the time it arrives
/// here; rows come back keyed by underlying field names.
#[async_trait]
pub trait DataEngine: Send + Sync {
    async fn read(&self, projection: ProjectionNode) -> anyhow::Result<serde_json::Value>;
}
