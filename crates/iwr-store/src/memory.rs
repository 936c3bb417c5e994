use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use iwr_types::{AttributeSet, EntityId, EntityType};

use crate::error::{StoreError, StoreResult};
use crate::traits::{RawDocument, StoreClient};
use crate::xml;

type Collection = BTreeMap<EntityId, AttributeSet>;

/// In-memory, HashMap-based attribute store.
///
/// Intended for tests and embedding. Objects must be created with
/// [`insert_object`](Self::insert_object) before attributes can be written to
/// them, mirroring the warehouse where objects are created upstream. Ids are
/// listed in sorted order.
pub struct InMemoryStore {
    collections: RwLock<HashMap<EntityType, Collection>>,
    unreachable: RwLock<BTreeSet<(EntityType, EntityId)>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            unreachable: RwLock::new(BTreeSet::new()),
        }
    }

    /// Create (or replace) an object with the given attributes.
    pub fn insert_object(&self, collection: EntityType, id: EntityId, attributes: AttributeSet) {
        self.collections
            .write()
            .expect("lock poisoned")
            .entry(collection)
            .or_default()
            .insert(id, attributes);
    }

    /// Snapshot of one object's attributes.
    pub fn object(&self, collection: EntityType, id: &EntityId) -> Option<AttributeSet> {
        self.collections
            .read()
            .expect("lock poisoned")
            .get(&collection)
            .and_then(|c| c.get(id))
            .cloned()
    }

    /// Number of objects in one collection.
    pub fn len(&self, collection: EntityType) -> usize {
        self.collections
            .read()
            .expect("lock poisoned")
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    /// Returns `true` if no collection holds any object.
    pub fn is_empty(&self) -> bool {
        self.collections
            .read()
            .expect("lock poisoned")
            .values()
            .all(BTreeMap::is_empty)
    }

    /// Keep listing `id` in `collection` but fail every read or write on it
    /// with a transport error.
    pub fn set_unreachable(&self, collection: EntityType, id: EntityId) {
        self.unreachable
            .write()
            .expect("lock poisoned")
            .insert((collection, id));
    }

    fn check_reachable(&self, collection: EntityType, id: &EntityId) -> StoreResult<()> {
        let unreachable = self.unreachable.read().expect("lock poisoned");
        if unreachable.contains(&(collection, id.clone())) {
            return Err(StoreError::Transport(format!(
                "{collection}/{id} is unreachable"
            )));
        }
        Ok(())
    }

    fn not_found(collection: EntityType, id: &EntityId) -> StoreError {
        StoreError::NotFound {
            collection,
            id: id.clone(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreClient for InMemoryStore {
    async fn get_attributes(&self, collection: EntityType, id: &EntityId) -> StoreResult<AttributeSet> {
        self.check_reachable(collection, id)?;
        self.object(collection, id)
            .ok_or_else(|| Self::not_found(collection, id))
    }

    async fn get_attribute(
        &self,
        collection: EntityType,
        id: &EntityId,
        name: &str,
    ) -> StoreResult<Option<String>> {
        let attributes = self.get_attributes(collection, id).await?;
        Ok(attributes.get(name).map(str::to_string))
    }

    async fn put_attribute(
        &self,
        collection: EntityType,
        id: &EntityId,
        name: &str,
        content: &str,
    ) -> StoreResult<()> {
        self.check_reachable(collection, id)?;
        let mut collections = self.collections.write().expect("lock poisoned");
        let object = collections
            .get_mut(&collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| Self::not_found(collection, id))?;
        object.insert(name, content);
        Ok(())
    }

    async fn list_ids(&self, collection: EntityType) -> StoreResult<Vec<EntityId>> {
        let mut ids: BTreeSet<EntityId> = self
            .collections
            .read()
            .expect("lock poisoned")
            .get(&collection)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        ids.extend(
            self.unreachable
                .read()
                .expect("lock poisoned")
                .iter()
                .filter(|(c, _)| *c == collection)
                .map(|(_, id)| id.clone()),
        );
        Ok(ids.into_iter().collect())
    }

    /// Serves the warehouse's XML listings and plain attribute values.
    /// Objects hold no data, so an object path answers with an empty body.
    async fn get_raw(&self, path: &str) -> StoreResult<RawDocument> {
        let missing = || StoreError::PathNotFound(path.trim_matches('/').to_string());
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let (bucket, rest) = segments.split_first().ok_or_else(missing)?;
        let collection = EntityType::from_collection(bucket).map_err(|_| missing())?;

        let (key, leaf) = match rest {
            [] => {
                let ids = self.list_ids(collection).await?;
                return Ok(RawDocument {
                    content_type: Some("application/xml".into()),
                    body: xml::render_key_listing(bucket, &ids),
                });
            }
            [key] => (*key, None),
            [key, leaf] => (*key, Some(*leaf)),
            _ => return Err(missing()),
        };
        let id = EntityId::new(key).map_err(|_| missing())?;
        let attributes = self.get_attributes(collection, &id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => missing(),
            other => other,
        })?;

        match leaf {
            None => Ok(RawDocument {
                content_type: Some("application/octet-stream".into()),
                body: String::new(),
            }),
            Some("_attrs") => Ok(RawDocument {
                content_type: Some("application/xml".into()),
                body: xml::render_attribute_listing(&attributes),
            }),
            Some(name) => attributes
                .get(name)
                .map(|content| RawDocument {
                    content_type: Some("text/plain".into()),
                    body: content.to_string(),
                })
                .ok_or_else(missing),
        }
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<EntityType, usize> = EntityType::ALL
            .into_iter()
            .map(|t| (t, self.len(t)))
            .collect();
        f.debug_struct("InMemoryStore")
            .field("object_counts", &counts)
            .finish()
    }
}
