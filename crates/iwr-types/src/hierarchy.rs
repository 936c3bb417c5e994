//! Static hierarchy model.
//!
//! One [`Level`] per [`EntityType`], naming its neighbours and the
//! [`Traversal`] strategy that discovers them. The resolver dispatches
//! generic "parents of X" / "children of X" requests through [`level`]
//! instead of re-encoding the hierarchy at each call site.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::reference::TypeTag;

/// Attribute on a provider image naming its image.
pub const IMAGE_LINK: &str = "image";

/// Attribute on an image naming its template.
pub const TEMPLATE_LINK: &str = "template";

/// Direction of a relationship query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Parents,
    Children,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parents => "parents",
            Self::Children => "children",
        }
    }

    /// Link `type` of the related objects, as seen from the queried one.
    pub const fn relation_kind(self) -> &'static str {
        match self {
            Self::Parents => "parent",
            Self::Children => "child",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one direction of one level is resolved against the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traversal {
    /// Read `attribute` from the queried object's own record; its content is
    /// the related id.
    Link { attribute: &'static str },
    /// Scan the `scan` collection and keep the members whose `attribute`
    /// names the queried id.
    ReverseLink {
        scan: EntityType,
        attribute: &'static str,
    },
    /// Every back-reference held by the queried object itself.
    BackReferences,
    /// Scan templates; for each template back-referencing the queried id,
    /// collect its back-references carrying `tag`.
    SharedTemplates { tag: TypeTag },
    /// Scan templates; collect those back-referencing the queried id.
    ReferencingTemplates,
    /// No relation exists in this direction.
    Unsupported,
}

/// Static knowledge about one level of the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level {
    pub entity: EntityType,
    pub parent: Option<EntityType>,
    pub child: Option<EntityType>,
    pub parents: Traversal,
    pub children: Traversal,
}

impl Level {
    pub const fn traversal(&self, direction: Direction) -> Traversal {
        match direction {
            Direction::Parents => self.parents,
            Direction::Children => self.children,
        }
    }

    /// The neighbouring type in `direction`.
    pub const fn neighbour(&self, direction: Direction) -> Option<EntityType> {
        match direction {
            Direction::Parents => self.parent,
            Direction::Children => self.child,
        }
    }

    pub fn supports(&self, direction: Direction) -> bool {
        self.traversal(direction) != Traversal::Unsupported
    }
}

/// The hierarchy, leaf first; indexed in [`EntityType::ALL`] order.
pub static LEVELS: [Level; 5] = [
    Level {
        entity: EntityType::ProviderImage,
        parent: Some(EntityType::Image),
        child: None,
        parents: Traversal::Link {
            attribute: IMAGE_LINK,
        },
        children: Traversal::Unsupported,
    },
    Level {
        entity: EntityType::Image,
        parent: Some(EntityType::Template),
        child: Some(EntityType::ProviderImage),
        parents: Traversal::Link {
            attribute: TEMPLATE_LINK,
        },
        children: Traversal::ReverseLink {
            scan: EntityType::ProviderImage,
            attribute: IMAGE_LINK,
        },
    },
    Level {
        entity: EntityType::Template,
        parent: Some(EntityType::Assembly),
        child: Some(EntityType::Image),
        parents: Traversal::BackReferences,
        children: Traversal::ReverseLink {
            scan: EntityType::Image,
            attribute: TEMPLATE_LINK,
        },
    },
    Level {
        entity: EntityType::Assembly,
        parent: Some(EntityType::Deployable),
        child: Some(EntityType::Template),
        parents: Traversal::SharedTemplates {
            tag: TypeTag::Deployable,
        },
        children: Traversal::ReferencingTemplates,
    },
    Level {
        entity: EntityType::Deployable,
        parent: None,
        child: Some(EntityType::Assembly),
        parents: Traversal::Unsupported,
        children: Traversal::SharedTemplates {
            tag: TypeTag::Assembly,
        },
    },
];

/// The level describing `entity`.
pub fn level(entity: EntityType) -> &'static Level {
    &LEVELS[entity as usize]
}
