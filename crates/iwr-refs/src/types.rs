//! Result types returned by the resolver and recorder.

use serde::{Deserialize, Serialize};
use iwr_types::{EntityId, EntityType};

/// One related object: its type and id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub entity: EntityType,
    pub id: EntityId,
}

impl Relation {
    pub fn new(entity: EntityType, id: EntityId) -> Self {
        Self { entity, id }
    }
}

/// The outcome of a `parents_of` / `children_of` query.
///
/// `skipped` counts scan members that could not be read and were left out.
/// A non-zero value means `relations` may be incomplete.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub relations: Vec<Relation>,
    pub skipped: usize,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Ids of the related objects, in result order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.relations.iter().map(|r| r.id.clone()).collect()
    }

    /// Ids of the related objects of one type, in result order.
    pub fn ids_of(&self, entity: EntityType) -> Vec<EntityId> {
        self.relations
            .iter()
            .filter(|r| r.entity == entity)
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.relations.iter().any(|r| &r.id == id)
    }
}

/// Members of one collection scan that passed a filter.
#[derive(Clone, Debug)]
pub struct ScanOutcome<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

/// The outcome of recording one payload.
///
/// `targets` lists every object a back-reference was written to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReport {
    pub recorded: Relation,
    pub targets: Vec<Relation>,
    pub skipped: usize,
}

impl RecordReport {
    pub fn new(recorded: Relation) -> Self {
        Self {
            recorded,
            targets: Vec::new(),
            skipped: 0,
        }
    }
}
