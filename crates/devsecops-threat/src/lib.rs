//! # DevSecOps Threat
//!
//! STRIDE threat modeling: a library of threat templates per component
//! type, placement of components that instantiates and risk-scores those
//! templates, the derived security score and the exported threat report.

pub mod library;
pub mod model;
pub mod report;
pub mod risk;

pub use library::*;
pub use model::*;
pub use report::*;
pub use risk::*;
