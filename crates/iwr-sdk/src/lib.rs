//! High-level SDK for image warehouse relations.
//!
//! Provides one handle, [`Relations`], over a store client for applications
//! that only need to query or record relationships.

pub mod error;
pub mod relations;

pub use error::{SdkError, SdkResult};
pub use relations::{parse_target, Relations};

// Re-export key types
pub use iwr_types::{Direction, EntityId, EntityType};
pub use iwr_store::{HttpStore, InMemoryStore, RawDocument, StoreClient, StoreConfig};
pub use iwr_refs::{AssemblyDescription, DeployableDescription, RecordReport, Relation, Resolution};
