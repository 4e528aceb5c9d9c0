//! Shared vocabulary for pipeline and threat models

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Software delivery pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Plan,
    Code,
    Build,
    Test,
    Release,
    Deploy,
    Monitor,
    Feedback,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 8] = [
        Stage::Plan,
        Stage::Code,
        Stage::Build,
        Stage::Test,
        Stage::Release,
        Stage::Deploy,
        Stage::Monitor,
        Stage::Feedback,
    ];

    /// Number of stages a pipeline can cover
    pub const COUNT: usize = Self::ALL.len();

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Code => "code",
            Stage::Build => "build",
            Stage::Test => "test",
            Stage::Release => "release",
            Stage::Deploy => "deploy",
            Stage::Monitor => "monitor",
            Stage::Feedback => "feedback",
        }
    }

    /// Human-readable stage name
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Plan => "Plan",
            Stage::Code => "Code",
            Stage::Build => "Build",
            Stage::Test => "Test",
            Stage::Release => "Release",
            Stage::Deploy => "Deploy",
            Stage::Monitor => "Monitor",
            Stage::Feedback => "Feedback",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownStage { stage: s.to_string() })
    }
}

/// Security tool category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCategory {
    #[serde(alias = "sast")]
    StaticAnalysis,
    #[serde(alias = "dast")]
    DynamicAnalysis,
    #[serde(alias = "container")]
    ContainerScan,
    PreCommit,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::StaticAnalysis => "static-analysis",
            ToolCategory::DynamicAnalysis => "dynamic-analysis",
            ToolCategory::ContainerScan => "container-scan",
            ToolCategory::PreCommit => "pre-commit",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal impact / likelihood level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::Info, Level::Low, Level::Medium, Level::High, Level::Critical];

    /// Risk matrix weight (info = 1 .. critical = 5)
    pub fn score(&self) -> u32 {
        match self {
            Level::Info => 1,
            Level::Low => 2,
            Level::Medium => 3,
            Level::High => 4,
            Level::Critical => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
            Level::Critical => "critical",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::InvalidValue {
                field: "level".to_string(),
                value: s.to_string(),
            })
    }
}

/// Risk bucket derived from impact x likelihood
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBucket {
    /// Bucket a raw impact x likelihood product
    pub fn from_product(product: u32) -> Self {
        match product {
            p if p >= 20 => RiskBucket::Critical,
            p if p >= 12 => RiskBucket::High,
            p if p >= 6 => RiskBucket::Medium,
            _ => RiskBucket::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBucket::Low => "low",
            RiskBucket::Medium => "medium",
            RiskBucket::High => "high",
            RiskBucket::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// STRIDE threat classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrideCategory {
    Spoofing,
    Tampering,
    Repudiation,
    InformationDisclosure,
    #[serde(alias = "dos")]
    DenialOfService,
    #[serde(alias = "elevation")]
    ElevationOfPrivilege,
}

impl StrideCategory {
    pub const ALL: [StrideCategory; 6] = [
        StrideCategory::Spoofing,
        StrideCategory::Tampering,
        StrideCategory::Repudiation,
        StrideCategory::InformationDisclosure,
        StrideCategory::DenialOfService,
        StrideCategory::ElevationOfPrivilege,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrideCategory::Spoofing => "spoofing",
            StrideCategory::Tampering => "tampering",
            StrideCategory::Repudiation => "repudiation",
            StrideCategory::InformationDisclosure => "information-disclosure",
            StrideCategory::DenialOfService => "denial-of-service",
            StrideCategory::ElevationOfPrivilege => "elevation-of-privilege",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StrideCategory::Spoofing => "Spoofing",
            StrideCategory::Tampering => "Tampering",
            StrideCategory::Repudiation => "Repudiation",
            StrideCategory::InformationDisclosure => "Information Disclosure",
            StrideCategory::DenialOfService => "Denial of Service",
            StrideCategory::ElevationOfPrivilege => "Privilege Escalation",
        }
    }
}

impl fmt::Display for StrideCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool configuration option value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl ConfigValue {
    /// Interpret a raw configuration form input.
    ///
    /// A checked checkbox submits `on`; comma separated text becomes a list.
    pub fn from_form_input(raw: &str) -> Self {
        if raw == "on" {
            ConfigValue::Bool(true)
        } else if raw.contains(',') {
            ConfigValue::List(raw.split(',').map(|item| item.to_string()).collect())
        } else {
            ConfigValue::Text(raw.to_string())
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        ConfigValue::List(value)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Text(s) => f.write_str(s),
            ConfigValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Option name -> value mapping carried by each tool
pub type ToolConfig = BTreeMap<String, ConfigValue>;

/// Turn a camelCase option name into title words (`failOnHigh` -> `Fail On High`)
pub fn format_config_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in key.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
