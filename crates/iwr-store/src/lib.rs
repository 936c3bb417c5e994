//! Attribute store client for the image warehouse.
//!
//! The warehouse is a flat, schema-less object store. Per object it can only
//! return the attribute set, read or write one named attribute, and list the
//! ids of a collection; any other resource can be fetched verbatim. This
//! crate hides the transport behind the [`StoreClient`] trait so the
//! relationship engine never sees HTTP or XML.
//!
//! # Backends
//!
//! - [`HttpStore`] -- talks to a running warehouse over HTTP
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Rules
//!
//! 1. No caching and no retries: every call is one round-trip.
//! 2. All transport errors are propagated, never silently ignored.
//! 3. The store never interprets attribute contents.

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod traits;
pub mod xml;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use http::HttpStore;
pub use memory::InMemoryStore;
pub use traits::{RawDocument, StoreClient};
