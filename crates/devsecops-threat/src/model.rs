//! Placed components, their instantiated threats and the security score

use crate::library::{ComponentType, ThreatLibrary, ThreatTemplate};
use crate::risk::compute_risk;
use devsecops_core::{IdGenerator, ModelError, ModelResult, RiskBucket, SequentialIdGenerator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Deducted from the security score for every critical threat
pub const CRITICAL_PENALTY: u32 = 5;

/// Triage state of a threat instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatStatus {
    #[default]
    Open,
    Mitigated,
    Accepted,
}

impl ThreatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatStatus::Open => "open",
            ThreatStatus::Mitigated => "mitigated",
            ThreatStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ThreatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreatStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(ThreatStatus::Open),
            "mitigated" => Ok(ThreatStatus::Mitigated),
            "accepted" => Ok(ThreatStatus::Accepted),
            _ => Err(ModelError::InvalidValue {
                field: "status".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Which threats count against the security score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringPolicy {
    /// Every critical threat is penalised, whatever its status
    #[default]
    AllThreats,
    /// Only critical threats still open are penalised
    OpenOnly,
}

impl ScoringPolicy {
    pub fn counts(&self, status: ThreatStatus) -> bool {
        match self {
            ScoringPolicy::AllThreats => true,
            ScoringPolicy::OpenOnly => status == ThreatStatus::Open,
        }
    }
}

/// A template instantiated on one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatInstance {
    pub id: String,
    #[serde(flatten)]
    pub template: ThreatTemplate,
    pub status: ThreatStatus,
    pub risk: RiskBucket,
}

impl ThreatInstance {
    fn instantiate(id: String, template: &ThreatTemplate) -> Self {
        Self {
            id,
            risk: compute_risk(template.impact, template.likelihood),
            template: template.clone(),
            status: ThreatStatus::Open,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.risk == RiskBucket::Critical
    }
}

/// An architecture component placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub x: f64,
    pub y: f64,
    pub threats: Vec<ThreatInstance>,
}

impl ComponentInstance {
    /// Whether any of the component's threats is critical
    pub fn is_vulnerable(&self) -> bool {
        self.threats.iter().any(ThreatInstance::is_critical)
    }

    pub fn threat(&self, threat_id: &str) -> Option<&ThreatInstance> {
        self.threats.iter().find(|threat| threat.id == threat_id)
    }
}

/// Threat model of a component architecture.
///
/// Every placed component receives a fresh copy of the templates registered
/// for its type, each scored with [`compute_risk`]. Later library changes do
/// not affect components already placed.
pub struct ThreatModel {
    library: ThreatLibrary,
    components: Vec<ComponentInstance>,
    ids: Box<dyn IdGenerator>,
    policy: ScoringPolicy,
}

impl ThreatModel {
    pub fn new(library: ThreatLibrary, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            library,
            components: Vec::new(),
            ids,
            policy: ScoringPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    pub fn library(&self) -> &ThreatLibrary {
        &self.library
    }

    /// Replace the templates instantiated for a component type
    pub fn register_threat_templates(&mut self, component_type: impl Into<ComponentType>, templates: Vec<ThreatTemplate>) {
        let component_type = ComponentType::normalized(component_type.into());
        debug!("Registering {} threat templates for {}", templates.len(), component_type);
        self.library.register(component_type, templates);
    }

    /// Place a component and instantiate its threats.
    ///
    /// Types with no registered templates are accepted with an empty threat list.
    pub fn place_component(&mut self, component_type: impl Into<ComponentType>, x: f64, y: f64) -> &ComponentInstance {
        let component_type = ComponentType::normalized(component_type.into());
        let id = self.ids.next_id("comp");

        if !self.library.contains(&component_type) {
            debug!("No threat templates for component type {}", component_type);
        }

        let threats = self
            .library
            .templates_for(&component_type)
            .iter()
            .map(|template| ThreatInstance::instantiate(self.ids.next_id("threat"), template))
            .collect::<Vec<_>>();

        info!("Placed {} component {} with {} threats", component_type, id, threats.len());

        let index = self.components.len();
        self.components.push(ComponentInstance {
            id,
            component_type,
            x,
            y,
            threats,
        });
        &self.components[index]
    }

    pub fn remove_component(&mut self, component_id: &str) -> ModelResult<ComponentInstance> {
        let index = self
            .components
            .iter()
            .position(|component| component.id == component_id)
            .ok_or_else(|| ModelError::not_found("component", component_id))?;

        info!("Removed component {}", component_id);
        Ok(self.components.remove(index))
    }

    pub fn move_component(&mut self, component_id: &str, x: f64, y: f64) -> ModelResult<()> {
        let component = self.component_mut(component_id)?;
        component.x = x;
        component.y = y;
        Ok(())
    }

    pub fn set_threat_status(&mut self, component_id: &str, threat_id: &str, status: ThreatStatus) -> ModelResult<()> {
        let component = self.component_mut(component_id)?;
        let threat = component
            .threats
            .iter_mut()
            .find(|threat| threat.id == threat_id)
            .ok_or_else(|| ModelError::not_found("threat", threat_id))?;

        info!("Threat {} on {} marked {}", threat_id, component_id, status);
        threat.status = status;
        Ok(())
    }

    pub fn component(&self, component_id: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|component| component.id == component_id)
    }

    fn component_mut(&mut self, component_id: &str) -> ModelResult<&mut ComponentInstance> {
        self.components
            .iter_mut()
            .find(|component| component.id == component_id)
            .ok_or_else(|| ModelError::not_found("component", component_id))
    }

    /// Components in placement order
    pub fn components(&self) -> &[ComponentInstance] {
        &self.components
    }

    fn threats(&self) -> impl Iterator<Item = &ThreatInstance> {
        self.components.iter().flat_map(|component| component.threats.iter())
    }

    pub fn threat_count(&self) -> usize {
        self.threats().count()
    }

    /// Critical threats across all components, whatever their status
    pub fn critical_count(&self) -> usize {
        self.threats().filter(|threat| threat.is_critical()).count()
    }

    pub fn high_count(&self) -> usize {
        self.threats().filter(|threat| threat.risk == RiskBucket::High).count()
    }

    /// Critical threats penalised under the scoring policy
    pub fn scored_critical_count(&self) -> usize {
        self.threats()
            .filter(|threat| threat.is_critical() && self.policy.counts(threat.status))
            .count()
    }

    /// 100 minus 5 per scored critical threat, floored at 0
    pub fn compute_security_score(&self) -> u32 {
        let penalty = u32::try_from(self.scored_critical_count())
            .unwrap_or(u32::MAX)
            .saturating_mul(CRITICAL_PENALTY);
        100u32.saturating_sub(penalty)
    }
}

impl Default for ThreatModel {
    fn default() -> Self {
        Self::new(ThreatLibrary::default(), Box::new(SequentialIdGenerator::new()))
    }
}

impl fmt::Debug for ThreatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreatModel")
            .field("library", &self.library)
            .field("components", &self.components)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
