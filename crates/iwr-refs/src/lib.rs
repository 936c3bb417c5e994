//! Relationship resolution for the image warehouse.
//!
//! The warehouse stores five collections of flat objects. Links between them
//! exist only as conventions on attribute names and contents:
//!
//! - A provider image names its image in an `image` attribute.
//! - An image names its template in a `template` attribute.
//! - Assemblies and deployables leave a `referenced_by_<id>` attribute on each
//!   template they use, with content `assembly` or `deployable`.
//!
//! This crate writes those back-references and answers parent/child queries
//! by scanning collections and filtering on the conventions.
//!
//! # Modules
//!
//! - [`handle`] -- [`ObjectHandle`], one object's loaded attribute set
//! - [`payload`] -- assembly and deployable descriptions, from XML or JSON
//! - [`recorder`] -- [`ReferenceRecorder`], the only writer
//! - [`resolver`] -- [`ReferenceResolver`], scan-and-filter traversal
//! - [`types`] -- [`Relation`], [`Resolution`], [`RecordReport`]

pub mod error;
pub mod handle;
pub mod payload;
pub mod recorder;
pub mod resolver;
pub mod types;

pub use error::{RefError, Result};
pub use handle::ObjectHandle;
pub use payload::{AssemblyDescription, DeployableDescription};
pub use recorder::ReferenceRecorder;
pub use resolver::{ReferenceResolver, DEFAULT_SCAN_CONCURRENCY};
pub use types::{RecordReport, Relation, Resolution, ScanOutcome};
