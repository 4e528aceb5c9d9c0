//! CLI command definitions and handlers

use crate::config::SiteConfig;
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use devsecops_core::{format_config_key, ConfigValue, Stage, ToolConfig};
use devsecops_interact::{
    copy_with_fallback, export_artifact, Checklist, CommandClipboard, FileExportSink, JsonFileStore,
    KeyValueStore, MemoryStore, StdoutClipboard,
};
use devsecops_pipeline::{PipelineModel, StageSecurityLevel, WORKFLOW_PATH};
use devsecops_threat::{compute_risk_from_labels, ComponentType, ThreatModel, ThreatStatus};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Main CLI structure
#[derive(Parser)]
#[command(name = "devsecops")]
#[command(about = "DevSecOps pipeline builder and STRIDE threat modeler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// JSON site configuration (catalogs, export options, scoring, checklist)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to run; without one an interactive shell starts
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline builder operations
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },

    /// Threat modeling operations
    Threat {
        #[command(subcommand)]
        command: ThreatCommands,
    },

    /// Security checklist operations
    Checklist {
        #[command(subcommand)]
        command: ChecklistCommands,
    },

    /// Show system information
    Info,
}

/// Pipeline builder subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// List the tool catalog
    Tools {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Attach a tool to a stage (its home stage when omitted)
    Attach {
        tool: String,

        #[arg(short, long)]
        stage: Option<Stage>,
    },

    /// Detach one occurrence of a tool from a stage
    Detach {
        tool: String,

        stage: Stage,

        /// Which occurrence to remove when the tool is attached more than once
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },

    /// Show or update a tool's configuration
    Configure {
        tool: String,

        /// Option to set; `on` means true and commas make a list
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        values: Vec<(String, String)>,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Enable or disable a security gate
    Gate {
        name: String,

        #[arg(long)]
        disable: bool,
    },

    /// Attach the sample tool set to their home stages
    Sample,

    /// Show stage assignments, gates and coverage
    Show {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the coverage score
    Score {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Export the pipeline as a workflow file
    Export {
        /// Load the sample pipeline first
        #[arg(long)]
        sample: bool,

        /// Directory to write the workflow file under
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Copy the workflow to the clipboard
        #[arg(long)]
        copy: bool,
    },
}

/// Threat modeling subcommands
#[derive(Subcommand)]
pub enum ThreatCommands {
    /// Place a component and derive its threats
    Place {
        component_type: String,

        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,

        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
    },

    /// Remove a placed component
    Remove { id: String },

    /// Move a placed component
    Move {
        id: String,

        #[arg(short, long, allow_negative_numbers = true)]
        x: f64,

        #[arg(short, long, allow_negative_numbers = true)]
        y: f64,
    },

    /// Set a threat's triage status
    Status {
        component: String,

        threat: String,

        status: ThreatStatus,
    },

    /// List placed components and their threats
    List {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the threat templates of the library
    Templates {
        /// Only this component type
        component_type: Option<String>,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the security score
    Score {
        /// Place components of these types first
        #[arg(long = "place", value_name = "TYPE")]
        place: Vec<String>,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Bucket an impact / likelihood pair
    Risk { impact: String, likelihood: String },

    /// Generate the threat report
    Report {
        /// Place components of these types first
        #[arg(long = "place", value_name = "TYPE")]
        place: Vec<String>,

        /// Directory to write the report under
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "json-pretty")]
        format: OutputFormat,
    },
}

/// Checklist subcommands
#[derive(Subcommand)]
pub enum ChecklistCommands {
    /// List checklist items
    List {
        /// Only items of this stage or section
        owner: Option<String>,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check or uncheck an item
    Toggle { owner: String, label: String },

    /// Show completion percentage
    Progress { owner: Option<String> },
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", raw)),
    }
}

fn render<T: Serialize + ?Sized>(format: OutputFormat, text: String, value: &T) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => text,
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    })
}

/// Command execution result
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl CommandResult {
    fn ok(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Execute CLI commands against one pipeline, threat model and checklist
pub struct CommandExecutor {
    config: SiteConfig,
    pipeline: PipelineModel,
    threats: ThreatModel,
    checklist: Checklist<Box<dyn KeyValueStore>>,
}

impl CommandExecutor {
    /// Executor over the built-in catalogs
    pub fn new() -> Result<Self> {
        Self::from_config(SiteConfig::default())
    }

    pub fn from_config(config: SiteConfig) -> Result<Self> {
        let pipeline = PipelineModel::new(config.pipeline.clone())?;
        let threats =
            ThreatModel::new(config.threat_library.clone(), config.ids.generator()).with_policy(config.scoring);

        let store: Box<dyn KeyValueStore> = match &config.checklist.store_path {
            Some(path) => Box::new(JsonFileStore::open(path)),
            None => Box::new(MemoryStore::new()),
        };
        let checklist = Checklist::with_items(
            store,
            config
                .checklist
                .items
                .iter()
                .map(|entry| (entry.owner.clone(), entry.label.clone())),
        );

        Ok(Self {
            config,
            pipeline,
            threats,
            checklist,
        })
    }

    pub fn pipeline(&self) -> &PipelineModel {
        &self.pipeline
    }

    pub fn threats(&self) -> &ThreatModel {
        &self.threats
    }

    pub fn checklist(&self) -> &Checklist<Box<dyn KeyValueStore>> {
        &self.checklist
    }

    /// Execute a CLI command
    pub async fn execute(&mut self, command: Commands) -> Result<CommandResult> {
        match command {
            Commands::Pipeline { command } => self.execute_pipeline_command(command).await,
            Commands::Threat { command } => self.execute_threat_command(command).await,
            Commands::Checklist { command } => self.execute_checklist_command(command),
            Commands::Info => self.execute_info(),
        }
    }

    async fn execute_pipeline_command(&mut self, command: PipelineCommands) -> Result<CommandResult> {
        match command {
            PipelineCommands::Tools { format } => {
                let tools = self.pipeline.tools();
                let mut text = format!("{} tools:\n", tools.len());
                for tool in tools {
                    let marker = if self.pipeline.critical_tools().contains(&tool.id) { " *" } else { "" };
                    text.push_str(&format!(
                        "  {:<12} {:<18} {:<17} home: {}{}\n",
                        tool.id, tool.name, tool.category, tool.stage, marker
                    ));
                }
                println!("{}", render(format, text, tools)?.trim_end());

                Ok(CommandResult::ok(
                    format!("{} tools in catalog", tools.len()),
                    serde_json::json!({ "tools": tools }),
                ))
            }
            PipelineCommands::Attach { tool, stage } => {
                let stage = match stage {
                    Some(stage) => {
                        self.pipeline.attach_tool(&tool, stage)?;
                        stage
                    }
                    None => self.pipeline.attach_to_home_stage(&tool)?,
                };

                Ok(CommandResult::ok(
                    format!("Attached {} to {}", tool, stage),
                    serde_json::json!({
                        "tool": tool,
                        "stage": stage,
                        "coverage": self.pipeline.compute_coverage_score()
                    }),
                ))
            }
            PipelineCommands::Detach { tool, stage, index } => {
                self.pipeline.detach_tool(&tool, stage, index)?;

                Ok(CommandResult::ok(
                    format!("Detached {} from {}", tool, stage),
                    serde_json::json!({
                        "tool": tool,
                        "stage": stage,
                        "coverage": self.pipeline.compute_coverage_score()
                    }),
                ))
            }
            PipelineCommands::Configure { tool, values, format } => {
                if !values.is_empty() {
                    let patch: ToolConfig = values
                        .iter()
                        .map(|(key, raw)| (key.clone(), ConfigValue::from_form_input(raw)))
                        .collect();
                    self.pipeline.update_tool_config(&tool, patch)?;
                }

                let definition = self
                    .pipeline
                    .tool(&tool)
                    .ok_or_else(|| anyhow!("Unknown tool: {}", tool))?;
                let mut text = format!("{} configuration:\n", definition.name);
                for (key, value) in &definition.config {
                    text.push_str(&format!("  {}: {}\n", format_config_key(key), value));
                }
                println!("{}", render(format, text, &definition.config)?.trim_end());

                let message = if values.is_empty() {
                    format!("Configuration of {}", tool)
                } else {
                    format!("Updated {} option(s) of {}", values.len(), tool)
                };
                Ok(CommandResult::ok(message, serde_json::json!({ "config": definition.config })))
            }
            PipelineCommands::Gate { name, disable } => {
                if disable {
                    if !self.pipeline.disable_gate(&name) {
                        return Ok(CommandResult {
                            success: false,
                            message: format!("Gate {} was not enabled", name),
                            data: None,
                        });
                    }
                    Ok(CommandResult::ok(format!("Disabled gate {}", name), serde_json::json!({ "gate": name })))
                } else {
                    self.pipeline.enable_gate(name.clone());
                    Ok(CommandResult::ok(format!("Enabled gate {}", name), serde_json::json!({ "gate": name })))
                }
            }
            PipelineCommands::Sample => {
                let attached = self.pipeline.load_sample_pipeline();
                Ok(CommandResult::ok(
                    format!("Loaded sample pipeline: {}", attached.join(", ")),
                    serde_json::json!({
                        "attached": attached,
                        "coverage": self.pipeline.compute_coverage_score()
                    }),
                ))
            }
            PipelineCommands::Show { format } => {
                let configuration = self.pipeline.get_configuration();
                let mut text = String::new();
                for summary in self.pipeline.stage_summaries() {
                    let level = match summary.security_level {
                        StageSecurityLevel::Secure => "secure",
                        StageSecurityLevel::Warning => "warning",
                    };
                    let tools = self.pipeline.stage_tools(summary.stage).join(", ");
                    text.push_str(&format!("{:<9} [{:<7}] {}\n", summary.display_name, level, tools));
                }
                let gates: Vec<&str> = configuration.security_gates.iter().map(String::as_str).collect();
                text.push_str(&format!("Gates: {}\n", if gates.is_empty() { "none".to_string() } else { gates.join(", ") }));
                text.push_str(&format!("Coverage: {}%", self.pipeline.compute_coverage_score()));
                println!("{}", render(format, text, &configuration)?);

                Ok(CommandResult::ok(
                    format!("{} of 8 stages configured", self.pipeline.configured_stage_count()),
                    serde_json::to_value(&configuration)?,
                ))
            }
            PipelineCommands::Score { format } => {
                let score = self.pipeline.compute_coverage_score();
                let configured = self.pipeline.configured_stage_count();
                let data = serde_json::json!({ "coverage": score, "configured_stages": configured });
                let text = format!("Coverage: {}% ({}/{} stages)", score, configured, Stage::COUNT);
                println!("{}", render(format, text, &data)?);

                Ok(CommandResult::ok(format!("Coverage {}%", score), data))
            }
            PipelineCommands::Export { sample, output, copy } => {
                if sample {
                    self.pipeline.load_sample_pipeline();
                }

                let exported = self.pipeline.export_with(&self.config.export);
                let yaml = exported.to_yaml();
                if !exported.unmapped_tools.is_empty() {
                    warn!("Tools without a workflow action: {}", exported.unmapped_tools.join(", "));
                }

                let mut success = true;
                let mut path = None;
                if let Some(dir) = &output {
                    path = export_artifact(&FileExportSink::new(dir), WORKFLOW_PATH, &yaml).await;
                    success = path.is_some();
                }

                let mut copied = None;
                if copy {
                    let outcome = copy_with_fallback(&CommandClipboard::system(), Some(&StdoutClipboard), &yaml).await;
                    copied = Some(format!("{:?}", outcome).to_lowercase());
                }

                if output.is_none() && !copy {
                    print!("{}", yaml);
                }

                let message = match &path {
                    Some(path) => format!("Workflow written to {}", path.display()),
                    None if output.is_some() => "Workflow export failed".to_string(),
                    None => "Workflow exported".to_string(),
                };

                Ok(CommandResult {
                    success,
                    message,
                    data: Some(serde_json::json!({
                        "path": path,
                        "unmapped_tools": exported.unmapped_tools,
                        "copied": copied,
                        "yaml": yaml
                    })),
                })
            }
        }
    }

    async fn execute_threat_command(&mut self, command: ThreatCommands) -> Result<CommandResult> {
        match command {
            ThreatCommands::Place { component_type, x, y } => {
                let component = self.threats.place_component(component_type.as_str(), x, y).clone();
                let critical = component.threats.iter().filter(|t| t.is_critical()).count();

                Ok(CommandResult::ok(
                    format!(
                        "Placed {} {} with {} threats ({} critical)",
                        component.component_type.display_name(),
                        component.id,
                        component.threats.len(),
                        critical
                    ),
                    serde_json::to_value(&component)?,
                ))
            }
            ThreatCommands::Remove { id } => {
                let removed = self.threats.remove_component(&id)?;
                Ok(CommandResult::ok(
                    format!("Removed {} {}", removed.component_type.display_name(), id),
                    serde_json::json!({ "removed": id, "score": self.threats.compute_security_score() }),
                ))
            }
            ThreatCommands::Move { id, x, y } => {
                self.threats.move_component(&id, x, y)?;
                Ok(CommandResult::ok(
                    format!("Moved {} to ({}, {})", id, x, y),
                    serde_json::json!({ "id": id, "x": x, "y": y }),
                ))
            }
            ThreatCommands::Status { component, threat, status } => {
                self.threats.set_threat_status(&component, &threat, status)?;
                Ok(CommandResult::ok(
                    format!("Threat {} is now {}", threat, status),
                    serde_json::json!({
                        "component": component,
                        "threat": threat,
                        "status": status,
                        "score": self.threats.compute_security_score()
                    }),
                ))
            }
            ThreatCommands::List { format } => {
                let components = self.threats.components();
                let mut text = format!("{} components:\n", components.len());
                for component in components {
                    let flag = if component.is_vulnerable() { " VULNERABLE" } else { "" };
                    text.push_str(&format!(
                        "{} {} ({}, {}){}\n",
                        component.id,
                        component.component_type.display_name(),
                        component.x,
                        component.y,
                        flag
                    ));
                    for threat in &component.threats {
                        text.push_str(&format!(
                            "  {} [{}] {}: {} ({})\n",
                            threat.id,
                            threat.risk,
                            threat.template.category.display_name(),
                            threat.template.description,
                            threat.status
                        ));
                    }
                }
                println!("{}", render(format, text, components)?.trim_end());

                Ok(CommandResult::ok(
                    format!("{} components", components.len()),
                    serde_json::json!({ "components": components }),
                ))
            }
            ThreatCommands::Templates { component_type, format } => {
                let library = self.threats.library();
                let selected: Vec<ComponentType> = match component_type {
                    Some(name) => vec![ComponentType::from(name)],
                    None => library.component_types().cloned().collect(),
                };

                let mut text = String::new();
                let mut data = serde_json::Map::new();
                for kind in &selected {
                    let templates = library.templates_for(kind);
                    text.push_str(&format!("{} ({}):\n", kind.display_name(), kind));
                    for template in templates {
                        text.push_str(&format!(
                            "  [{}/{}] {}: {}\n    Mitigation: {}\n",
                            template.impact,
                            template.likelihood,
                            template.category.display_name(),
                            template.description,
                            template.mitigation
                        ));
                    }
                    data.insert(kind.to_string(), serde_json::to_value(templates)?);
                }
                let data = serde_json::Value::Object(data);
                println!("{}", render(format, text, &data)?.trim_end());

                Ok(CommandResult::ok(format!("{} component types", selected.len()), data))
            }
            ThreatCommands::Score { place, format } => {
                for component_type in &place {
                    self.threats.place_component(component_type.as_str(), 0.0, 0.0);
                }

                let score = self.threats.compute_security_score();
                let data = serde_json::json!({
                    "score": score,
                    "critical": self.threats.critical_count(),
                    "high": self.threats.high_count(),
                    "policy": self.threats.policy()
                });
                let text = format!(
                    "Security score: {} ({} critical, {} high)",
                    score,
                    self.threats.critical_count(),
                    self.threats.high_count()
                );
                println!("{}", render(format, text, &data)?);

                Ok(CommandResult::ok(format!("Security score {}", score), data))
            }
            ThreatCommands::Risk { impact, likelihood } => {
                let risk = compute_risk_from_labels(&impact, &likelihood);
                Ok(CommandResult::ok(
                    format!("Risk: {}", risk),
                    serde_json::json!({ "impact": impact, "likelihood": likelihood, "risk": risk }),
                ))
            }
            ThreatCommands::Report { place, output, format } => {
                for component_type in &place {
                    self.threats.place_component(component_type.as_str(), 0.0, 0.0);
                }

                let report = self.threats.generate_report();
                let json = report.to_json_pretty()?;

                let mut success = true;
                let mut path = None;
                match &output {
                    Some(dir) => {
                        path = export_artifact(&FileExportSink::new(dir), &report.file_name(), &json).await;
                        success = path.is_some();
                    }
                    None => {
                        let summary = &report.summary;
                        let mut text = format!(
                            "Components: {}\nThreats: {} ({} critical, {} high)\n",
                            summary.total_components, summary.total_threats, summary.critical_threats, summary.high_threats
                        );
                        for recommendation in &report.recommendations {
                            text.push_str(&format!(
                                "[{}] {} / {}: {}\n",
                                recommendation.priority,
                                recommendation.component.display_name(),
                                recommendation.threat.display_name(),
                                recommendation.recommendation
                            ));
                        }
                        println!("{}", render(format, text, &report)?.trim_end());
                    }
                }

                info!("Generated threat report with {} recommendations", report.recommendations.len());
                let message = match &path {
                    Some(path) => format!("Report written to {}", path.display()),
                    None if output.is_some() => "Report export failed".to_string(),
                    None => format!("Report with {} recommendations", report.recommendations.len()),
                };

                Ok(CommandResult {
                    success,
                    message,
                    data: Some(serde_json::json!({
                        "path": path,
                        "file_name": report.file_name(),
                        "report": report
                    })),
                })
            }
        }
    }

    fn execute_checklist_command(&mut self, command: ChecklistCommands) -> Result<CommandResult> {
        match command {
            ChecklistCommands::List { owner, format } => {
                let items: Vec<_> = match &owner {
                    Some(owner) => self.checklist.items_for(owner).cloned().collect(),
                    None => self.checklist.items().to_vec(),
                };

                let mut text = String::new();
                for item in &items {
                    let mark = if item.checked { "x" } else { " " };
                    text.push_str(&format!("[{}] {:<9} {}\n", mark, item.owner, item.label));
                }
                println!("{}", render(format, text, &items)?.trim_end());

                Ok(CommandResult::ok(
                    format!("{} checklist items", items.len()),
                    serde_json::json!({ "items": items }),
                ))
            }
            ChecklistCommands::Toggle { owner, label } => {
                let checked = self.checklist.toggle(&owner, &label)?;
                Ok(CommandResult::ok(
                    format!("{} {}", if checked { "Checked" } else { "Unchecked" }, label),
                    serde_json::json!({ "owner": owner, "label": label, "checked": checked }),
                ))
            }
            ChecklistCommands::Progress { owner } => {
                let progress = match &owner {
                    Some(owner) => self.checklist.progress_for(owner),
                    None => self.checklist.progress(),
                };

                let message = match progress {
                    Some(progress) => format!("DevSecOps Progress: {:.1}%", progress),
                    None => "No checklist items".to_string(),
                };
                Ok(CommandResult::ok(message, serde_json::json!({ "owner": owner, "progress": progress })))
            }
        }
    }

    fn execute_info(&self) -> Result<CommandResult> {
        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "repository": env!("CARGO_PKG_REPOSITORY"),
            "tools": self.pipeline.tools().len(),
            "component_types": self.threats.library().component_types().count(),
            "scoring": self.config.scoring,
            "features": ["pipeline-builder", "threat-modeler", "checklist", "cli"]
        });

        let result = serde_json::to_string_pretty(&info)?;
        println!("{}", result);

        Ok(CommandResult::ok("System information", info))
    }
}
