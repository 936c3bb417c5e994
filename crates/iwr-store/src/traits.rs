use async_trait::async_trait;
use iwr_types::{AttributeSet, EntityId, EntityType};

use crate::error::StoreResult;

/// A warehouse document relayed verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDocument {
    pub content_type: Option<String>,
    pub body: String,
}

/// Client for the warehouse attribute store.
///
/// Implementations must satisfy these invariants:
/// - Each call is a single remote round-trip; no caching, no retries.
/// - Concurrent calls are always safe. Reads never block each other.
/// - `put_attribute` is last-write-wins per attribute name.
/// - Attribute contents are opaque strings, never interpreted.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Load the full attribute set of one object.
    ///
    /// Returns `Err(NotFound)` if the object does not exist.
    async fn get_attributes(&self, collection: EntityType, id: &EntityId) -> StoreResult<AttributeSet>;

    /// Read one attribute of one object.
    ///
    /// Returns `Ok(None)` if the attribute is not set.
    async fn get_attribute(
        &self,
        collection: EntityType,
        id: &EntityId,
        name: &str,
    ) -> StoreResult<Option<String>>;

    /// Set (create or overwrite) one attribute of one object.
    async fn put_attribute(
        &self,
        collection: EntityType,
        id: &EntityId,
        name: &str,
        content: &str,
    ) -> StoreResult<()>;

    /// List every object id in a collection.
    async fn list_ids(&self, collection: EntityType) -> StoreResult<Vec<EntityId>>;

    /// Fetch any warehouse resource by its path below the base URL.
    ///
    /// Returns `Err(PathNotFound)` if the warehouse has nothing there.
    async fn get_raw(&self, path: &str) -> StoreResult<RawDocument>;
}
