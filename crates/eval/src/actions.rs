//! Post-award action dispatch seam.
//!
//! A rule's `actions` list is opaque to the evaluator: what a descriptor
//! means (an email, a webhook, an XP grant through
//! [`XpStore::grant_xp`](accolade_storage::XpStore::grant_xp)) is entirely
//! the sink implementation's business. The engine only guarantees WHEN the
//! sink runs: after the award record is written.

use std::fmt;

use accolade_core::AchievementRule;
use accolade_storage::AwardRecord;
use async_trait::async_trait;

use crate::context::EvalContext;

/// An action implementation failed.
///
/// The award is already durable by the time actions run; failures are
/// reported, not rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError(pub String);

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action failed: {}", self.0)
    }
}

impl std::error::Error for ActionError {}

/// Where a rule's post-award effects are carried out.
#[async_trait]
pub trait ActionSink: Send + Sync {
    /// Run the rule's action descriptors for a freshly written award.
    async fn invoke(
        &self,
        rule: &AchievementRule,
        award: &AwardRecord,
        ctx: &EvalContext<'_>,
    ) -> Result<(), ActionError>;
}

/// Discards every action. The default for tests and action-less
/// deployments.
pub struct NoopSink;

#[async_trait]
impl ActionSink for NoopSink {
    async fn invoke(
        &self,
        _rule: &AchievementRule,
        _award: &AwardRecord,
        _ctx: &EvalContext<'_>,
    ) -> Result<(), ActionError> {
        Ok(())
    }
}
