use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The five collection types of the warehouse, ordered leaf to root.
///
/// A `ProviderImage` is referenced by an `Image`, which is referenced by a
/// `Template`, and so on up to `Deployable`. The derived `Ord` follows that
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    ProviderImage,
    Image,
    Template,
    Assembly,
    Deployable,
}

impl EntityType {
    /// All types, leaf first.
    pub const ALL: [EntityType; 5] = [
        EntityType::ProviderImage,
        EntityType::Image,
        EntityType::Template,
        EntityType::Assembly,
        EntityType::Deployable,
    ];

    /// Name of the store collection holding objects of this type.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::ProviderImage => "provider_images",
            Self::Image => "images",
            Self::Template => "templates",
            Self::Assembly => "assemblies",
            Self::Deployable => "deployables",
        }
    }

    /// Singular name, used as the `rel` of hypermedia links.
    pub const fn singular(self) -> &'static str {
        match self {
            Self::ProviderImage => "provider_image",
            Self::Image => "image",
            Self::Template => "template",
            Self::Assembly => "assembly",
            Self::Deployable => "deployable",
        }
    }

    /// Look up a type by its store collection name.
    pub fn from_collection(name: &str) -> Result<Self, TypeError> {
        Self::ALL
            .into_iter()
            .find(|t| t.collection() == name)
            .ok_or_else(|| TypeError::UnknownCollection(name.to_string()))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for EntityType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_collection(s)
            .or_else(|_| {
                Self::ALL
                    .into_iter()
                    .find(|t| t.singular() == s)
                    .ok_or_else(|| TypeError::UnknownCollection(s.to_string()))
            })
    }
}

/// Store-assigned object identifier.
///
/// Treated as an opaque string. Historically UUID-shaped, but any non-empty
/// string is accepted as long as it can be embedded in a store URL path
/// segment: no `/`, no whitespace, no control characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Validate and wrap an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidId {
                id,
                reason: "must not be empty".into(),
            });
        }
        if let Some(ch) = id.chars().find(|c| *c == '/' || c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidId {
                reason: format!("contains forbidden character {ch:?}"),
                id,
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntityId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
