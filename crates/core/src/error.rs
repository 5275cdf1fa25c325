//! Configuration errors raised while parsing a rule document.

use std::fmt;

/// Errors detected at load / tree-construction time.
///
/// Every variant carries enough of the offending definition to diagnose the
/// document without re-reading it. A `ConfigError` is fatal for the single
/// rule being parsed; whether it aborts the whole load is the caller's
/// choice (see [`LoadOutcome::strict`](crate::catalogue::LoadOutcome::strict)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document root is not a mapping with an `achievements` key.
    Document { message: String },
    /// An amount spec is neither an integer nor an `"<op> <int>"` string.
    InvalidAmount { spec: String },
    /// An amount spec uses an operator outside the six supported symbols.
    UnknownOperator { op: String },
    /// A requirement definition carries none of the known discriminants.
    InvalidRequirement { definition: String },
    /// A condition node is neither a parameter leaf nor a combinator.
    InvalidCondition { definition: String },
    /// A rule-level field has the wrong shape (e.g. `replaces` not a list).
    InvalidRule { rule: String, message: String },
    /// A rule failed to parse; wraps the underlying error with the rule name.
    InRule { rule: String, error: Box<ConfigError> },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Document { message } => {
                write!(f, "invalid rule document: {}", message)
            }
            ConfigError::InvalidAmount { spec } => {
                write!(f, "invalid amount spec: {}", spec)
            }
            ConfigError::UnknownOperator { op } => {
                write!(f, "unknown amount operator: {}", op)
            }
            ConfigError::InvalidRequirement { definition } => {
                write!(
                    f,
                    "invalid requirement, one of achievement/xp/event/AnyOf/OneOf must be set: {}",
                    definition
                )
            }
            ConfigError::InvalidCondition { definition } => {
                write!(
                    f,
                    "invalid condition, one of parameter/AnyOf/OneOf must be set: {}",
                    definition
                )
            }
            ConfigError::InvalidRule { rule, message } => {
                write!(f, "invalid rule '{}': {}", rule, message)
            }
            ConfigError::InRule { rule, error } => {
                write!(f, "rule '{}': {}", rule, error)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
