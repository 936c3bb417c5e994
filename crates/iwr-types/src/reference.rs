//! The back-reference attribute convention.
//!
//! The store has no relationships, so a child records that it refers to a
//! parent by writing an attribute on the *parent*:
//!
//! ```text
//! referenced_by_<child id> = <child type tag>
//! ```
//!
//! Everything outside this module works with [`BackReference`] values and
//! never builds or slices raw attribute names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityType};
use crate::error::TypeError;

/// Attribute name prefix marking a back-reference.
pub const BACK_REFERENCE_PREFIX: &str = "referenced_by_";

/// Type of the referencing object, stored as the back-reference content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Assembly,
    Deployable,
}

impl TypeTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assembly => "assembly",
            Self::Deployable => "deployable",
        }
    }

    /// The entity type that writes back-references with this tag.
    pub const fn entity_type(self) -> EntityType {
        match self {
            Self::Assembly => EntityType::Assembly,
            Self::Deployable => EntityType::Deployable,
        }
    }

    /// The tag written by objects of `entity`, if that type records references.
    pub const fn for_entity(entity: EntityType) -> Option<Self> {
        match entity {
            EntityType::Assembly => Some(Self::Assembly),
            EntityType::Deployable => Some(Self::Deployable),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = TypeError;

    /// Exact match only: `"Assembly"` or `" assembly"` are malformed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assembly" => Ok(Self::Assembly),
            "deployable" => Ok(Self::Deployable),
            other => Err(TypeError::MalformedReference(other.to_string())),
        }
    }
}

/// A typed back-reference held by some parent object.
///
/// `tag` is `None` when the stored content is not one of the recognized tags.
/// Such references still name their referrer but are invisible to
/// tag-discriminating queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackReference {
    pub ref_id: EntityId,
    pub tag: Option<TypeTag>,
}

impl BackReference {
    pub fn new(ref_id: EntityId, tag: TypeTag) -> Self {
        Self {
            ref_id,
            tag: Some(tag),
        }
    }

    /// Attribute name under which a reference from `ref_id` is stored.
    pub fn attribute_name_for(ref_id: &EntityId) -> String {
        format!("{BACK_REFERENCE_PREFIX}{ref_id}")
    }

    pub fn attribute_name(&self) -> String {
        Self::attribute_name_for(&self.ref_id)
    }

    /// Attribute content to store, or `None` for an untagged reference.
    pub fn content(&self) -> Option<&'static str> {
        self.tag.map(TypeTag::as_str)
    }

    /// Interpret a raw attribute.
    ///
    /// Returns `None` when `name` is not a back-reference, or when the id
    /// after the prefix is not a valid [`EntityId`].
    pub fn parse(name: &str, content: &str) -> Option<Self> {
        let ref_id = EntityId::new(name.strip_prefix(BACK_REFERENCE_PREFIX)?).ok()?;
        Some(Self {
            ref_id,
            tag: content.parse().ok(),
        })
    }

    /// Whether `name` follows the back-reference naming convention.
    pub fn is_reference_name(name: &str) -> bool {
        name.starts_with(BACK_REFERENCE_PREFIX)
    }

    pub fn has_tag(&self, tag: TypeTag) -> bool {
        self.tag == Some(tag)
    }

    pub fn is_assembly(&self) -> bool {
        self.has_tag(TypeTag::Assembly)
    }

    pub fn is_deployable(&self) -> bool {
        self.has_tag(TypeTag::Deployable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    #[test]
    fn attribute_name_uses_prefix() {
        let r = BackReference::new(id("A1"), TypeTag::Assembly);
        assert_eq!(r.attribute_name(), "referenced_by_A1");
        assert_eq!(r.content(), Some("assembly"));
    }

    #[test]
    fn parse_strips_prefix_exactly() {
        // The id itself contains prefix characters; only the leading prefix goes.
        let r = BackReference::parse("referenced_by_deadbeef-rbe", "deployable").unwrap();
        assert_eq!(r.ref_id, "deadbeef-rbe");
        assert!(r.is_deployable());
        assert!(!r.is_assembly());
    }

    #[test]
    fn parse_ignores_other_attributes() {
        assert!(BackReference::parse("template", "T1").is_none());
        assert!(BackReference::parse("xreferenced_by_A1", "assembly").is_none());
        assert!(BackReference::parse("referenced_by_", "assembly").is_none());
    }

    #[test]
    fn unknown_content_is_untagged() {
        let r = BackReference::parse("referenced_by_A1", "templates").unwrap();
        assert_eq!(r.tag, None);
        assert!(!r.is_assembly());
        assert!(!r.is_deployable());
        assert_eq!(r.content(), None);
    }

    #[test]
    fn tags_match_exactly() {
        assert_eq!("assembly".parse::<TypeTag>(), Ok(TypeTag::Assembly));
        assert!("Assembly".parse::<TypeTag>().is_err());
        assert!("assembly ".parse::<TypeTag>().is_err());
        assert!("".parse::<TypeTag>().is_err());
    }

    #[test]
    fn tag_entity_mapping() {
        assert_eq!(TypeTag::Deployable.entity_type(), EntityType::Deployable);
        assert_eq!(TypeTag::for_entity(EntityType::Assembly), Some(TypeTag::Assembly));
        assert_eq!(TypeTag::for_entity(EntityType::Template), None);
    }
}
