//! Configuration resolution for the rust-ci workflow.
//!
//! Turns a loosely-specified configuration document into the canonical
//! document consumed by the workflow template renderer.
//!
//! # Pipeline
//!
//! 1. [`schema`] - strict shape validation of the authored JSON
//! 2. [`layer`] - every omitted field is filled from the [`defaults`] table
//! 3. [`Resolver`] - the execution target is resolved (override or document)
//! 4. [`normalize`] - empty matrix `os` lists fall back to the execution target
//!
//! [`ConfigBuilder`] is the programmatic alternative; it draws from the same
//! default table and yields the same shape.
//!
//! # Example
//!
//! ```rust
//! use rustci_config::Resolver;
//!
//! let document = r#"{
//!     "global": {}, "release": {}, "pages": {}, "jobs": {},
//!     "ai": { "prompt": "Review this pull request" }
//! }"#;
//!
//! let config = Resolver::new()
//!     .with_execution_target("ubuntu-latest")
//!     .resolve_str(document)?;
//!
//! assert_eq!(config.jobs.coverage.matrix.os, vec!["ubuntu-latest"]);
//! # Ok::<(), rustci_config::Error>(())
//! ```

pub mod builder;
pub mod defaults;
pub mod error;
pub mod layer;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod schema;

pub use builder::{ClippyOptions, ConfigBuilder, ExtraOptions, MatrixOptions};
pub use error::{Error, Result};
pub use layer::{Layer, layer};
pub use model::{
    AiJob, BaseJob, Codecov, Condition, ConfigDocument, CoverageJob, ExtraJob, Global, JobName,
    Jobs, LintJob, MatrixSpec, PageJob, Packages, Pages, Platform, Release, ReleaseTarget, Runner,
    SanitizerSuite,
};
pub use normalize::normalize;
pub use resolve::{Resolver, emit, resolve};
pub use schema::{RawConfig, SchemaVariant, json_schema};
