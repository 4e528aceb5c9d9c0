//! Site configuration loaded from `--config`

use anyhow::{Context, Result};
use devsecops_core::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
use devsecops_pipeline::{ExportOptions, PipelineCatalog};
use devsecops_threat::{ScoringPolicy, ThreatLibrary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Checklist shipped with the site, as (stage, item) pairs
pub const DEFAULT_CHECKLIST: [(&str, &str); 12] = [
    ("plan", "Threat model new features"),
    ("plan", "Define security requirements"),
    ("code", "Enable pre-commit secret detection"),
    ("code", "Run SAST on every pull request"),
    ("build", "Scan dependencies for known vulnerabilities"),
    ("build", "Scan container images"),
    ("test", "Run DAST against staging"),
    ("release", "Sign release artifacts"),
    ("deploy", "Check infrastructure as code against policy"),
    ("monitor", "Forward security events to the SIEM"),
    ("monitor", "Alert on runtime anomalies"),
    ("feedback", "Feed incident findings back into threat models"),
];

/// How placed components and threats are identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStyle {
    /// `comp_1`, `threat_2`, ...
    #[default]
    Sequential,
    Uuid,
}

impl IdStyle {
    pub fn generator(&self) -> Box<dyn IdGenerator> {
        match self {
            IdStyle::Sequential => Box::new(SequentialIdGenerator::new()),
            IdStyle::Uuid => Box::new(UuidIdGenerator),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub owner: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    /// JSON state file; `null` keeps checklist state in memory only
    pub store_path: Option<PathBuf>,
    pub items: Vec<ChecklistEntry>,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            store_path: Some(PathBuf::from(".devsecops/checklist.json")),
            items: DEFAULT_CHECKLIST
                .iter()
                .map(|(owner, label)| ChecklistEntry {
                    owner: owner.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }
}

/// Everything the command executor is built from.
///
/// Every section is optional and falls back to the built-in catalogs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub pipeline: PipelineCatalog,
    pub threat_library: ThreatLibrary,
    pub export: ExportOptions,
    pub scoring: ScoringPolicy,
    pub ids: IdStyle,
    pub checklist: ChecklistConfig,
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SiteConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, otherwise the built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
