//! Evaluation errors.

use std::fmt;

use accolade_storage::StoreError;

/// Which unique-record fact stream an integrity violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactKind {
    Award,
    Xp,
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactKind::Award => write!(f, "award"),
            FactKind::Xp => write!(f, "xp"),
        }
    }
}

/// Errors that can occur while evaluating a rule against the fact stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A store returned more than one record for a unique (scope, name)
    /// key. Signals a consistency bug upstream -- never a normal outcome,
    /// and never resolved by silently picking one record. Fatal for this
    /// one evaluation; sibling rules continue.
    Integrity {
        kind: FactKind,
        name: String,
        count: usize,
    },
    /// A fact-store query failed. Propagated without retry; a calling
    /// layer may retry the whole rule evaluation.
    Query(StoreError),
    /// A rule's scope names a key the context cannot supply.
    MissingScopeValue { key: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Integrity { kind, name, count } => {
                write!(
                    f,
                    "integrity violation: {} {} records for unique key '{}'",
                    count, kind, name
                )
            }
            EvalError::Query(e) => {
                write!(f, "fact store query failed: {}", e)
            }
            EvalError::MissingScopeValue { key } => {
                write!(f, "scope key '{}' has no value in the evaluation context", key)
            }
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalError::Query(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for EvalError {
    fn from(e: StoreError) -> EvalError {
        EvalError::Query(e)
    }
}
