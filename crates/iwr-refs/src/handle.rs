//! A loaded object and its derived reference views.

use iwr_store::{StoreClient, StoreResult};
use iwr_types::{AttributeSet, BackReference, EntityId, EntityType, TypeTag};

/// One object's attribute set, loaded in full from the store.
///
/// The handle is a snapshot: it never re-reads the store, so every view below
/// reflects the attributes as they were at [`load`](Self::load) time.
#[derive(Clone, Debug)]
pub struct ObjectHandle {
    entity: EntityType,
    id: EntityId,
    attributes: AttributeSet,
}

impl ObjectHandle {
    /// Load an object. Fails with `NotFound` if the store has no such id.
    pub async fn load(store: &dyn StoreClient, entity: EntityType, id: &EntityId) -> StoreResult<Self> {
        let attributes = store.get_attributes(entity, id).await?;
        Ok(Self::from_attributes(entity, id.clone(), attributes))
    }

    pub fn from_attributes(entity: EntityType, id: EntityId, attributes: AttributeSet) -> Self {
        Self {
            entity,
            id,
            attributes,
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Typed back-references held by this object.
    pub fn references(&self) -> Vec<BackReference> {
        self.attributes.back_references().collect()
    }

    /// Ids of every object referencing this one, tagged or not.
    pub fn back_references(&self) -> Vec<EntityId> {
        self.attributes.back_references().map(|r| r.ref_id).collect()
    }

    /// Raw content of the back-reference written by `ref_id`.
    pub fn reference_tag(&self, ref_id: &EntityId) -> Option<&str> {
        self.attributes.get(&BackReference::attribute_name_for(ref_id))
    }

    pub fn references_id(&self, ref_id: &EntityId) -> bool {
        self.attributes.contains(&BackReference::attribute_name_for(ref_id))
    }

    /// Ids of back-references whose tag is exactly `tag`.
    pub fn referrers_tagged(&self, tag: TypeTag) -> Vec<EntityId> {
        self.attributes
            .back_references()
            .filter(|r| r.has_tag(tag))
            .map(|r| r.ref_id)
            .collect()
    }

    /// Content of a plain attribute such as a link.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }
}
