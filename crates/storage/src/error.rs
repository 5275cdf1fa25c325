/// All errors that can be returned by a fact-store implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A backend-specific failure (connection, serialization, etc.).
    ///
    /// The evaluator propagates this without retrying; a calling layer may
    /// retry the whole rule evaluation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The query cannot be answered because it lacks a key the store
    /// requires (e.g. an XP lookup without a subject).
    #[error("query for '{name}' missing required key '{key}'")]
    MissingKey { name: String, key: String },
}
