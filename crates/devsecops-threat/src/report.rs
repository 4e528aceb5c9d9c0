//! Threat report document

use crate::library::ComponentType;
use crate::model::{ComponentInstance, ThreatModel};
use chrono::{DateTime, Utc};
use devsecops_core::StrideCategory;
use serde::{Deserialize, Serialize};

/// Priority attached to every recommendation
pub const RECOMMENDATION_PRIORITY: &str = "HIGH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_components: usize,
    pub total_threats: usize,
    pub critical_threats: usize,
    pub high_threats: usize,
}

/// Remediation advice for one critical threat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub component: ComponentType,
    pub threat: StrideCategory,
    pub recommendation: String,
    pub priority: String,
}

/// Snapshot of the model with summary counts and recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatReport {
    pub timestamp: DateTime<Utc>,
    pub components: Vec<ComponentInstance>,
    pub summary: ReportSummary,
    pub recommendations: Vec<Recommendation>,
}

impl ThreatReport {
    /// Download name, `threat-report-YYYY-MM-DD.json`
    pub fn file_name(&self) -> String {
        format!("threat-report-{}.json", self.timestamp.format("%Y-%m-%d"))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl ThreatModel {
    pub fn generate_report(&self) -> ThreatReport {
        self.generate_report_at(Utc::now())
    }

    /// Build the report with a fixed timestamp.
    ///
    /// Summary counts and recommendations cover every critical threat,
    /// independent of triage status.
    pub fn generate_report_at(&self, timestamp: DateTime<Utc>) -> ThreatReport {
        let components = self.components();

        let recommendations = components
            .iter()
            .flat_map(|component| {
                component
                    .threats
                    .iter()
                    .filter(|threat| threat.is_critical())
                    .map(move |threat| Recommendation {
                        component: component.component_type.clone(),
                        threat: threat.template.category,
                        recommendation: format!("Implement {}", threat.template.mitigation),
                        priority: RECOMMENDATION_PRIORITY.to_string(),
                    })
            })
            .collect();

        ThreatReport {
            timestamp,
            components: components.to_vec(),
            summary: ReportSummary {
                total_components: components.len(),
                total_threats: self.threat_count(),
                critical_threats: self.critical_count(),
                high_threats: self.high_count(),
            },
            recommendations,
        }
    }
}
