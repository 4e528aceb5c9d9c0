//! Workflow document generation

use crate::model::PipelineModel;
use devsecops_core::{Mapping, Node};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Conventional location of the generated workflow file
pub const WORKFLOW_PATH: &str = ".github/workflows/devsecops-pipeline.yml";

/// Settings for the exported workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub pipeline_name: String,
    /// Branch that triggers the workflow on push and pull request
    pub branch: String,
    pub runner: String,
    pub checkout_action: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pipeline_name: "DevSecOps Pipeline".to_string(),
            branch: "main".to_string(),
            runner: "ubuntu-latest".to_string(),
            checkout_action: "actions/checkout@v3".to_string(),
        }
    }
}

/// Generated workflow plus the tools that could not be mapped to an action
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedPipeline {
    pub document: Mapping,
    /// Attached tools with no action entry; they get no workflow step
    pub unmapped_tools: Vec<String>,
}

impl ExportedPipeline {
    pub fn to_yaml(&self) -> String {
        self.document.to_yaml()
    }
}

impl PipelineModel {
    /// Export the pipeline with default options
    pub fn export_configuration(&self) -> ExportedPipeline {
        self.export_with(&ExportOptions::default())
    }

    /// Export the pipeline as a workflow document
    pub fn export_with(&self, options: &ExportOptions) -> ExportedPipeline {
        let branches = || Mapping::new().with("branches", Node::List(vec![Node::text(options.branch.clone())]));
        let triggers = Mapping::new()
            .with("push", branches())
            .with("pull_request", branches());

        let mut jobs = Mapping::new();
        let mut unmapped_tools: Vec<String> = Vec::new();

        for assignment in self.get_configuration().stages {
            if assignment.tools.is_empty() {
                continue;
            }

            let mut steps = vec![Node::Map(
                Mapping::new()
                    .with("name", Node::text("Checkout code"))
                    .with("uses", Node::text(options.checkout_action.clone())),
            )];

            for tool_id in &assignment.tools {
                let Some(tool) = self.tool(tool_id) else { continue };

                let Some(action) = self.actions.get(tool_id) else {
                    if !unmapped_tools.contains(tool_id) {
                        warn!("No workflow action for tool {}, skipping its step", tool_id);
                        unmapped_tools.push(tool_id.clone());
                    }
                    continue;
                };

                let mut step = Mapping::new()
                    .with("name", Node::text(format!("Run {}", tool.name)))
                    .with("uses", Node::text(action.clone()));

                if !tool.config.is_empty() {
                    let with = tool
                        .config
                        .iter()
                        .fold(Mapping::new(), |map, (key, value)| map.with(key.clone(), Node::from(value)));
                    step.insert("with", with);
                }

                steps.push(Node::Map(step));
            }

            jobs.insert(
                format!("{}-security", assignment.stage),
                Mapping::new()
                    .with("runs-on", Node::text(options.runner.clone()))
                    .with("steps", Node::List(steps)),
            );
        }

        let document = Mapping::new()
            .with("name", Node::text(options.pipeline_name.clone()))
            .with("on", triggers)
            .with("jobs", jobs);

        ExportedPipeline {
            document,
            unmapped_tools,
        }
    }
}
