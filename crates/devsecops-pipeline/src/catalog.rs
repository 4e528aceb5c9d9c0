//! Security tool definitions and the built-in tool library

use devsecops_core::{ConfigValue, Stage, ToolCategory, ToolConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tools attached by [`crate::PipelineModel::load_sample_pipeline`], in order
pub const SAMPLE_PIPELINE: [&str; 4] = ["pre-commit", "sonarqube", "trivy", "zap"];

/// A security tool that can be attached to pipeline stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub id: String,
    pub name: String,
    pub category: ToolCategory,
    /// Stage the tool naturally belongs to
    pub stage: Stage,
    #[serde(default)]
    pub config: ToolConfig,
}

impl ToolDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ToolCategory, stage: Stage) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            stage,
            config: ToolConfig::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

/// Everything a [`crate::PipelineModel`] is configured with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineCatalog {
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    /// Tools whose presence marks a stage as securely covered
    #[serde(default)]
    pub critical_tools: BTreeSet<String>,
    /// Tool id -> workflow action reference
    #[serde(default)]
    pub actions: BTreeMap<String, String>,
}

impl PipelineCatalog {
    /// A catalog with no tools, critical tools or actions
    pub fn empty() -> Self {
        Self {
            tools: Vec::new(),
            critical_tools: BTreeSet::new(),
            actions: BTreeMap::new(),
        }
    }

    pub fn with_tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_critical_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.critical_tools.insert(tool_id.into());
        self
    }

    pub fn with_action(mut self, tool_id: impl Into<String>, action: impl Into<String>) -> Self {
        self.actions.insert(tool_id.into(), action.into());
        self
    }
}

impl Default for PipelineCatalog {
    fn default() -> Self {
        Self::empty()
            .with_tool(
                ToolDefinition::new("sonarqube", "SonarQube", ToolCategory::StaticAnalysis, Stage::Code)
                    .with_option("qualityGate", true)
                    .with_option("securityHotspots", true),
            )
            .with_tool(
                ToolDefinition::new("snyk", "Snyk Code", ToolCategory::StaticAnalysis, Stage::Code)
                    .with_option("severityThreshold", "high")
                    .with_option("failOnIssues", true),
            )
            .with_tool(
                ToolDefinition::new("zap", "OWASP ZAP", ToolCategory::DynamicAnalysis, Stage::Test)
                    .with_option("scanType", "full")
                    .with_option("failOnHigh", true),
            )
            .with_tool(
                ToolDefinition::new("trivy", "Trivy", ToolCategory::ContainerScan, Stage::Build)
                    .with_option("scanType", "image,vulnerability")
                    .with_option("severity", "CRITICAL,HIGH"),
            )
            .with_tool(
                ToolDefinition::new("pre-commit", "Pre-commit Hooks", ToolCategory::PreCommit, Stage::Code)
                    .with_option(
                        "hooks",
                        vec!["secret-detection".to_string(), "sast-basic".to_string()],
                    ),
            )
            .with_critical_tool("snyk")
            .with_critical_tool("zap")
            .with_critical_tool("trivy")
            .with_action("sonarqube", "SonarSource/sonarqube-scan-action@v4")
            .with_action("snyk", "snyk/actions/node@master")
            .with_action("zap", "zaproxy/action-full-scan@v0.4.0")
            .with_action("trivy", "aquasecurity/trivy-action@master")
    }
}
