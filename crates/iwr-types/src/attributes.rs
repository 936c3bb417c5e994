use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::EntityId;
use crate::reference::BackReference;

/// The complete attribute map of one stored object.
///
/// Always loaded in full. Names iterate in sorted order, which is one valid
/// instance of the store's unspecified enumeration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    entries: BTreeMap<String, String>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert or overwrite an attribute, returning the previous content.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), content.into())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every attribute that follows the back-reference convention.
    ///
    /// A prefixed name whose suffix is not a valid id is logged and left out.
    pub fn back_references(&self) -> impl Iterator<Item = BackReference> + '_ {
        self.iter().filter_map(|(name, content)| {
            let parsed = BackReference::parse(name, content);
            if parsed.is_none() && BackReference::is_reference_name(name) {
                warn!(attribute = name, "ignoring back-reference with an unusable id");
            }
            parsed
        })
    }

    /// The back-reference written by `ref_id`, if any.
    pub fn back_reference(&self, ref_id: &EntityId) -> Option<BackReference> {
        let name = BackReference::attribute_name_for(ref_id);
        BackReference::parse(&name, self.get(&name)?)
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
