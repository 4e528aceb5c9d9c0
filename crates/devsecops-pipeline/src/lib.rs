//! # DevSecOps Pipeline
//!
//! Pipeline builder model: a catalog of security tools, their assignment to
//! the eight delivery stages, the derived configuration and coverage score,
//! and export of the pipeline as a workflow document.

pub mod catalog;
pub mod export;
pub mod model;

pub use catalog::*;
pub use export::*;
pub use model::*;
