//! Component types and the STRIDE threat template library

use devsecops_core::{Level, StrideCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Architecture component kind
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentType {
    WebServer,
    Database,
    Api,
    Auth,
    /// Any kind outside the built-in set
    Other(String),
}

impl ComponentType {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::WebServer => "web-server",
            ComponentType::Database => "database",
            ComponentType::Api => "api",
            ComponentType::Auth => "auth",
            ComponentType::Other(name) => name,
        }
    }

    /// Map `Other` names of built-in kinds back onto their variants
    pub fn normalized(self) -> Self {
        match self {
            ComponentType::Other(name) => ComponentType::from(name.as_str()),
            kind => kind,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ComponentType::WebServer => "Web Server",
            ComponentType::Database => "Database",
            ComponentType::Api => "API Gateway",
            ComponentType::Auth => "Auth Service",
            ComponentType::Other(name) => name,
        }
    }
}

impl From<&str> for ComponentType {
    fn from(name: &str) -> Self {
        match name {
            "web-server" => ComponentType::WebServer,
            "database" => ComponentType::Database,
            "api" => ComponentType::Api,
            "auth" => ComponentType::Auth,
            other => ComponentType::Other(other.to_string()),
        }
    }
}

impl From<String> for ComponentType {
    fn from(name: String) -> Self {
        ComponentType::from(name.as_str())
    }
}

impl From<ComponentType> for String {
    fn from(kind: ComponentType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threat instantiated for every component of a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatTemplate {
    #[serde(rename = "type")]
    pub category: StrideCategory,
    pub description: String,
    pub impact: Level,
    pub likelihood: Level,
    pub mitigation: String,
}

impl ThreatTemplate {
    pub fn new(
        category: StrideCategory,
        description: impl Into<String>,
        impact: Level,
        likelihood: Level,
        mitigation: impl Into<String>,
    ) -> Self {
        Self {
            category,
            description: description.into(),
            impact,
            likelihood,
            mitigation: mitigation.into(),
        }
    }
}

/// Component type -> threat templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreatLibrary {
    templates: BTreeMap<ComponentType, Vec<ThreatTemplate>>,
}

impl ThreatLibrary {
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Replace the template list of a component type
    pub fn register(&mut self, component_type: ComponentType, templates: Vec<ThreatTemplate>) {
        self.templates.insert(component_type.normalized(), templates);
    }

    pub fn with(mut self, component_type: ComponentType, templates: Vec<ThreatTemplate>) -> Self {
        self.register(component_type, templates);
        self
    }

    /// Templates for a type; empty for unknown types
    pub fn templates_for(&self, component_type: &ComponentType) -> &[ThreatTemplate] {
        self.templates
            .get(component_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, component_type: &ComponentType) -> bool {
        self.templates.contains_key(component_type)
    }

    pub fn component_types(&self) -> impl Iterator<Item = &ComponentType> {
        self.templates.keys()
    }
}

impl Default for ThreatLibrary {
    fn default() -> Self {
        use Level::*;
        use StrideCategory::*;

        Self::empty()
            .with(
                ComponentType::WebServer,
                vec![
                    ThreatTemplate::new(
                        Spoofing,
                        "Server impersonation or DNS spoofing",
                        High,
                        Medium,
                        "Implement TLS, use certificate pinning",
                    ),
                    ThreatTemplate::new(
                        Tampering,
                        "Unauthorized modification of server content",
                        High,
                        Medium,
                        "File integrity monitoring, WAF protection",
                    ),
                ],
            )
            .with(
                ComponentType::Database,
                vec![
                    ThreatTemplate::new(
                        InformationDisclosure,
                        "Unauthorized data access",
                        Critical,
                        High,
                        "Encryption at rest, proper access controls",
                    ),
                    ThreatTemplate::new(
                        Tampering,
                        "Data manipulation through SQL injection",
                        Critical,
                        High,
                        "Parameterized queries, input validation",
                    ),
                ],
            )
            .with(
                ComponentType::Api,
                vec![
                    ThreatTemplate::new(
                        Spoofing,
                        "API key theft or misuse",
                        High,
                        Medium,
                        "API key rotation, request signing",
                    ),
                    ThreatTemplate::new(
                        ElevationOfPrivilege,
                        "Privilege escalation through API endpoints",
                        High,
                        Medium,
                        "Proper authorization checks",
                    ),
                ],
            )
            .with(
                ComponentType::Auth,
                vec![
                    ThreatTemplate::new(
                        Spoofing,
                        "Authentication bypass",
                        Critical,
                        Medium,
                        "Multi-factor authentication, strong session management",
                    ),
                    ThreatTemplate::new(
                        Repudiation,
                        "Lack of audit trails for auth events",
                        Medium,
                        High,
                        "Comprehensive logging and monitoring",
                    ),
                ],
            )
    }
}
