//! Model-level error kinds

/// Errors surfaced by pipeline and threat model operations.
///
/// All of them are local and non-fatal: a failed operation leaves the model
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Duplicate catalog key: {key}")]
    DuplicateKey { key: String },

    #[error("Unknown tool: {tool_id}")]
    UnknownTool { tool_id: String },

    /// Reserved for callers that require a known type. Component placement
    /// tolerates unknown types with an empty threat list and never raises it.
    #[error("Unknown component type: {component_type}")]
    UnknownComponentType { component_type: String },

    #[error("Unknown pipeline stage: {stage}")]
    UnknownStage { stage: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl ModelError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ModelError::NotFound { kind, id: id.into() }
    }
}

/// Result alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
