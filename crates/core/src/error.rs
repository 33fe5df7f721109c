//! Domain error model.

use thiserror::Error;

/// Result type used across the engine.
pub type DomainResult<T> = Result<T, DomainError>;

/// Engine-level error taxonomy.
///
/// Every layer converts its own typed errors into one of these variants before
/// they reach a caller outside the engine (HTTP, CLI, UI bridge). The variants
/// carry rendered names rather than typed values so this crate stays free of
/// booking-specific types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A raw record could not be adapted into a canonical booking.
    #[error("malformed {kind} record: missing or invalid field `{field}`")]
    Adaptation { kind: String, field: String },

    /// A status or payment change is not an edge of the lifecycle graph.
    #[error("illegal {kind} transition from {from} to {to}")]
    IllegalTransition {
        kind: String,
        from: String,
        to: String,
    },

    /// Unknown identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// The authoritative store or upstream transport failed (network, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// Malformed input such as an unknown filter value.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A concurrent writer won the race (stale version).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn adaptation(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Adaptation {
            kind: kind.into(),
            field: field.into(),
        }
    }

    pub fn illegal_transition(
        kind: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::IllegalTransition {
            kind: kind.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Stable machine-readable code, used in HTTP error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Adaptation { .. } => "adaptation_error",
            DomainError::IllegalTransition { .. } => "illegal_transition",
            DomainError::NotFound(_) => "not_found",
            DomainError::Transport(_) => "transport_error",
            DomainError::Validation(_) => "validation_error",
            DomainError::Conflict(_) => "conflict",
        }
    }
}
