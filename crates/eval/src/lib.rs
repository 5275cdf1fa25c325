//! Achievement rule evaluator -- checks requirement trees against the fact
//! stores, gates awards, and writes award records with replacement chains.
//!
//! The catalogue (`accolade-core`) says what to award; the stores
//! (`accolade-storage`) own the facts; this crate decides and records. A
//! typical deployment runs [`run_cycle`] once per incoming domain event,
//! with a context naming the event's subject. Callers that want finer
//! control compose the single-rule entry points ([`rule_is_fulfilled`],
//! [`can_be_awarded`], [`grant`]) themselves; those propagate errors
//! directly instead of folding them into an outcome.

pub mod actions;
pub mod award;
pub mod context;
pub mod error;
pub mod requirement;

use accolade_core::{AchievementRule, RuleCatalogue};
use accolade_storage::AwardRecord;
use tracing::warn;

pub use actions::{ActionError, ActionSink, NoopSink};
pub use award::{can_be_awarded, grant};
pub use context::EvalContext;
pub use error::{EvalError, FactKind};
pub use requirement::{is_fulfilled, rule_is_fulfilled};

/// What happened to one rule during a cycle.
#[derive(Debug)]
pub enum RuleOutcome {
    /// Requirements unmet; nothing written.
    NotFulfilled { rule: String },
    /// Fulfilled, but the award cap for this scope is already reached.
    CapReached { rule: String },
    /// Awarded; the record is the post-write state.
    Granted { rule: String, record: AwardRecord },
    /// Evaluation failed; sibling rules were still evaluated.
    Failed { rule: String, error: EvalError },
}

impl RuleOutcome {
    pub fn rule_name(&self) -> &str {
        match self {
            RuleOutcome::NotFulfilled { rule }
            | RuleOutcome::CapReached { rule }
            | RuleOutcome::Granted { rule, .. }
            | RuleOutcome::Failed { rule, .. } => rule,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, RuleOutcome::Granted { .. })
    }
}

/// Evaluate every rule in the catalogue for one subject/event cycle.
///
/// Rules run sequentially in document order, so an award granted early in
/// the cycle is visible to the rules after it (chained achievements rely
/// on this together with the stores' read-your-writes guarantee). One
/// rule's failure -- an integrity violation or a store error -- is
/// captured in its outcome and never aborts the siblings.
pub async fn run_cycle(
    catalogue: &RuleCatalogue,
    ctx: &EvalContext<'_>,
    actions: &dyn ActionSink,
) -> Vec<RuleOutcome> {
    let mut outcomes = Vec::with_capacity(catalogue.len());
    for rule in catalogue.rules() {
        outcomes.push(run_rule(rule, ctx, actions).await);
    }
    outcomes
}

async fn run_rule(
    rule: &AchievementRule,
    ctx: &EvalContext<'_>,
    actions: &dyn ActionSink,
) -> RuleOutcome {
    let name = rule.name.clone();
    let result: Result<RuleOutcome, EvalError> = async {
        if !rule_is_fulfilled(rule, ctx).await? {
            return Ok(RuleOutcome::NotFulfilled { rule: name.clone() });
        }
        if !can_be_awarded(rule, ctx).await? {
            return Ok(RuleOutcome::CapReached { rule: name.clone() });
        }
        let record = grant(rule, ctx).await?;
        if let Err(e) = actions.invoke(rule, &record, ctx).await {
            // The award is already durable; action failures are reported,
            // not rolled back.
            warn!(rule = %name, error = %e, "post-award actions failed");
        }
        Ok(RuleOutcome::Granted {
            rule: name.clone(),
            record,
        })
    }
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!(rule = %name, error = %error, "rule evaluation failed");
            RuleOutcome::Failed { rule: name, error }
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
