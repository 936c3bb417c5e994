//! Foundation types for Image Warehouse Relations (IWR).
//!
//! The image warehouse is a flat attribute store: every object is a bag of
//! named string attributes inside one of five collections. This crate defines
//! the vocabulary the rest of the workspace uses to turn that bag into a typed
//! graph.
//!
//! # Key Types
//!
//! - [`EntityType`] -- the five ordered collection types
//! - [`EntityId`] -- opaque, validated object identifier
//! - [`TypeTag`] -- content of a back-reference (`assembly` / `deployable`)
//! - [`BackReference`] -- typed view over a `referenced_by_<id>` attribute
//! - [`AttributeSet`] -- the full attribute map of one object
//! - [`Level`] / [`Traversal`] -- the static hierarchy model

pub mod attributes;
pub mod entity;
pub mod error;
pub mod hierarchy;
pub mod reference;

pub use attributes::AttributeSet;
pub use entity::{EntityId, EntityType};
pub use error::TypeError;
pub use hierarchy::{level, Direction, Level, Traversal, IMAGE_LINK, LEVELS, TEMPLATE_LINK};
pub use reference::{BackReference, TypeTag, BACK_REFERENCE_PREFIX};
