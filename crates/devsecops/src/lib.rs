//! # DevSecOps - Security Pipeline & Threat Modeling Stack
//!
//! Models behind an interactive DevSecOps guide: a pipeline builder that
//! assigns security tools to delivery stages and exports a workflow, a
//! STRIDE threat modeler that scores placed architecture components, and a
//! persisted security checklist.
//!
//! ## Quick Start
//!
//! ```rust
//! use devsecops::prelude::*;
//!
//! let mut pipeline = PipelineModel::new(PipelineCatalog::default()).unwrap();
//! pipeline.attach_tool("trivy", Stage::Build).unwrap();
//! assert_eq!(pipeline.compute_coverage_score(), 13);
//!
//! let mut threats = ThreatModel::default();
//! threats.place_component("database", 120.0, 80.0);
//! assert_eq!(threats.compute_security_score(), 90);
//! ```
//!
//! ## Architecture
//!
//! - **`devsecops-core`**: stages, levels, STRIDE categories, errors, ids, YAML rendering
//! - **`devsecops-pipeline`**: tool catalog, stage assignment, coverage, workflow export
//! - **`devsecops-threat`**: threat library, component placement, risk and score, reports
//! - **`devsecops-interact`**: checklist persistence, clipboard and artifact export
//!
//! ## Feature Flags
//!
//! - `full` (default): everything below
//! - `pipeline`: pipeline builder
//! - `threat`: threat modeler
//! - `interact`: checklist, clipboard and export I/O

pub use devsecops_core as core;

#[cfg(feature = "pipeline")]
pub use devsecops_pipeline as pipeline;

#[cfg(feature = "threat")]
pub use devsecops_threat as threat;

#[cfg(feature = "interact")]
pub use devsecops_interact as interact;

// Convenience re-exports for common types
pub use devsecops_core::{ModelError, ModelResult, Stage};

#[cfg(feature = "pipeline")]
pub use devsecops_pipeline::{PipelineCatalog, PipelineModel};

#[cfg(feature = "threat")]
pub use devsecops_threat::{ThreatLibrary, ThreatModel, ThreatReport};

// Commonly used external dependencies
pub use anyhow;
pub use serde;
pub use serde_json;

/// Prelude module for convenient imports
///
/// ```rust
/// use devsecops::prelude::*;
/// ```
pub mod prelude {
    pub use devsecops_core::{
        ConfigValue, IdGenerator, Level, ModelError, ModelResult, RiskBucket, SequentialIdGenerator, Stage,
        StrideCategory, ToolCategory,
    };

    #[cfg(feature = "pipeline")]
    pub use devsecops_pipeline::{ExportOptions, PipelineCatalog, PipelineModel, ToolDefinition};

    #[cfg(feature = "threat")]
    pub use devsecops_threat::{
        compute_risk, ComponentType, ScoringPolicy, ThreatLibrary, ThreatModel, ThreatStatus, ThreatTemplate,
    };

    #[cfg(feature = "interact")]
    pub use devsecops_interact::{Checklist, JsonFileStore, KeyValueStore, MemoryStore};

    // Common external types
    pub use anyhow::Result;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
}

/// Current version of the stack
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Basic information to verify the stack is wired up
pub fn health_check() -> serde_json::Value {
    serde_json::json!({
        "status": "healthy",
        "version": VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "modules": {
            "core": true,
            "pipeline": cfg!(feature = "pipeline"),
            "threat": cfg!(feature = "threat"),
            "interact": cfg!(feature = "interact")
        }
    })
}
