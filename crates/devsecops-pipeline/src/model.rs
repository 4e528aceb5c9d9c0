//! Pipeline builder state and derived configuration

use crate::catalog::{PipelineCatalog, ToolDefinition, SAMPLE_PIPELINE};
use devsecops_core::{ModelError, ModelResult, Stage, ToolConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Tools attached to one stage, in attachment order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAssignment {
    pub stage: Stage,
    pub tools: Vec<String>,
}

/// Snapshot derived from the model on every query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfiguration {
    /// Every stage in pipeline order, empty ones included
    pub stages: Vec<StageAssignment>,
    pub security_gates: BTreeSet<String>,
    /// Configuration of each tool attached somewhere in the pipeline
    pub tools: BTreeMap<String, ToolConfig>,
}

impl PipelineConfiguration {
    pub fn stage(&self, stage: Stage) -> Option<&StageAssignment> {
        self.stages.iter().find(|assignment| assignment.stage == stage)
    }
}

/// Display classification of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageSecurityLevel {
    Secure,
    Warning,
}

/// Per-stage view used by front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: Stage,
    pub display_name: String,
    pub tool_count: usize,
    pub security_level: StageSecurityLevel,
}

/// Pipeline builder model
#[derive(Debug, Clone)]
pub struct PipelineModel {
    tools: Vec<ToolDefinition>,
    critical_tools: BTreeSet<String>,
    pub(crate) actions: BTreeMap<String, String>,
    assignments: BTreeMap<Stage, Vec<String>>,
    gates: BTreeSet<String>,
}

impl PipelineModel {
    /// Build a model from a catalog, rejecting duplicate tool ids
    pub fn new(catalog: PipelineCatalog) -> ModelResult<Self> {
        let mut model = Self {
            tools: Vec::with_capacity(catalog.tools.len()),
            critical_tools: catalog.critical_tools,
            actions: catalog.actions,
            assignments: BTreeMap::new(),
            gates: BTreeSet::new(),
        };

        for tool in catalog.tools {
            model.register_tool(tool)?;
        }

        Ok(model)
    }

    /// Add a tool definition to the catalog
    pub fn register_tool(&mut self, definition: ToolDefinition) -> ModelResult<()> {
        if self.tool(&definition.id).is_some() {
            return Err(ModelError::DuplicateKey { key: definition.id });
        }

        debug!("Registering tool {} ({})", definition.id, definition.category);
        self.tools.push(definition);
        Ok(())
    }

    /// Look up a catalog entry
    pub fn tool(&self, tool_id: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|tool| tool.id == tool_id)
    }

    /// All catalog entries in registration order
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn critical_tools(&self) -> &BTreeSet<String> {
        &self.critical_tools
    }

    /// Append a tool to a stage
    pub fn attach_tool(&mut self, tool_id: &str, stage: Stage) -> ModelResult<()> {
        if self.tool(tool_id).is_none() {
            return Err(ModelError::UnknownTool { tool_id: tool_id.to_string() });
        }

        self.assignments.entry(stage).or_default().push(tool_id.to_string());
        info!("Attached {} to {} stage", tool_id, stage);
        Ok(())
    }

    /// Attach a tool to the stage its definition names
    pub fn attach_to_home_stage(&mut self, tool_id: &str) -> ModelResult<Stage> {
        let stage = self
            .tool(tool_id)
            .map(|tool| tool.stage)
            .ok_or_else(|| ModelError::UnknownTool { tool_id: tool_id.to_string() })?;

        self.attach_tool(tool_id, stage)?;
        Ok(stage)
    }

    /// Attach the sample tools that exist in the catalog; returns those attached
    pub fn load_sample_pipeline(&mut self) -> Vec<String> {
        let mut attached = Vec::new();
        for tool_id in SAMPLE_PIPELINE {
            if self.attach_to_home_stage(tool_id).is_ok() {
                attached.push(tool_id.to_string());
            }
        }
        attached
    }

    /// Remove the `occurrence_index`-th occurrence of a tool from a stage
    pub fn detach_tool(&mut self, tool_id: &str, stage: Stage, occurrence_index: usize) -> ModelResult<()> {
        let not_found = || ModelError::not_found("Stage attachment", format!("{}@{}#{}", tool_id, stage, occurrence_index));

        let tools = self.assignments.get_mut(&stage).ok_or_else(not_found)?;
        let position = tools
            .iter()
            .enumerate()
            .filter(|(_, id)| id.as_str() == tool_id)
            .map(|(position, _)| position)
            .nth(occurrence_index)
            .ok_or_else(not_found)?;

        tools.remove(position);
        if tools.is_empty() {
            self.assignments.remove(&stage);
        }

        info!("Detached {} from {} stage", tool_id, stage);
        Ok(())
    }

    /// Merge option values into a tool's configuration, overwriting existing keys
    pub fn update_tool_config(&mut self, tool_id: &str, patch: ToolConfig) -> ModelResult<()> {
        let tool = self
            .tools
            .iter_mut()
            .find(|tool| tool.id == tool_id)
            .ok_or_else(|| ModelError::UnknownTool { tool_id: tool_id.to_string() })?;

        debug!("Updating {} config keys: {:?}", tool_id, patch.keys().collect::<Vec<_>>());
        tool.config.extend(patch);
        Ok(())
    }

    pub fn enable_gate(&mut self, label: impl Into<String>) {
        self.gates.insert(label.into());
    }

    /// Returns whether the gate was enabled
    pub fn disable_gate(&mut self, label: &str) -> bool {
        self.gates.remove(label)
    }

    /// Tools attached to a stage, in attachment order
    pub fn stage_tools(&self, stage: Stage) -> &[String] {
        self.assignments.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Derive the current pipeline configuration
    pub fn get_configuration(&self) -> PipelineConfiguration {
        let stages = Stage::ALL
            .iter()
            .map(|&stage| StageAssignment {
                stage,
                tools: self.stage_tools(stage).to_vec(),
            })
            .collect();

        let attached: BTreeSet<&str> = self
            .assignments
            .values()
            .flatten()
            .map(String::as_str)
            .collect();

        let tools = self
            .tools
            .iter()
            .filter(|tool| attached.contains(tool.id.as_str()))
            .map(|tool| (tool.id.clone(), tool.config.clone()))
            .collect();

        PipelineConfiguration {
            stages,
            security_gates: self.gates.clone(),
            tools,
        }
    }

    /// Number of stages with at least one attached tool
    pub fn configured_stage_count(&self) -> usize {
        Stage::ALL
            .iter()
            .filter(|&&stage| !self.stage_tools(stage).is_empty())
            .count()
    }

    /// Percentage of stages covered by at least one tool, rounded
    pub fn compute_coverage_score(&self) -> u32 {
        let ratio = self.configured_stage_count() as f64 / Stage::COUNT as f64;
        (ratio * 100.0).round() as u32
    }

    /// Whether any tool attached to the stage is in the critical set
    pub fn stage_has_critical_coverage(&self, stage: Stage) -> bool {
        self.stage_tools(stage)
            .iter()
            .any(|tool_id| self.critical_tools.contains(tool_id))
    }

    pub fn stage_security_level(&self, stage: Stage) -> StageSecurityLevel {
        if self.stage_has_critical_coverage(stage) {
            StageSecurityLevel::Secure
        } else {
            StageSecurityLevel::Warning
        }
    }

    pub fn stage_summaries(&self) -> Vec<StageSummary> {
        Stage::ALL
            .iter()
            .map(|&stage| StageSummary {
                stage,
                display_name: stage.display_name().to_string(),
                tool_count: self.stage_tools(stage).len(),
                security_level: self.stage_security_level(stage),
            })
            .collect()
    }
}
