//! Award gating, grants, and replacement chains.

use accolade_core::AchievementRule;
use accolade_storage::AwardRecord;
use tracing::{debug, info};

use crate::context::EvalContext;
use crate::error::EvalError;

/// Whether the rule may still be awarded within its scope.
///
/// Sums the running amounts of prior award records for (scope, rule name);
/// awardable iff the sum is strictly below `max_awarded`. Summing covers
/// stores that keep one record with a running amount as well as stores
/// that append one record per award.
pub async fn can_be_awarded(
    rule: &AchievementRule,
    ctx: &EvalContext<'_>,
) -> Result<bool, EvalError> {
    let query = ctx.scope_query(&rule.name, &rule.scope)?;
    let prior: i64 = ctx.awards.find(&query).await?.iter().map(|r| r.amount).sum();
    debug!(rule = %rule.name, prior, cap = rule.max_awarded, "award gate");
    Ok(prior < rule.max_awarded)
}

/// Record an award for the rule, then retract every rule it replaces.
///
/// Replacement is scope-local: only award records under the same scope-key
/// values are retracted. The award write precedes the retractions; the two
/// are not atomic, and a failed retraction surfaces after the award is
/// already durable.
pub async fn grant(
    rule: &AchievementRule,
    ctx: &EvalContext<'_>,
) -> Result<AwardRecord, EvalError> {
    let query = ctx.scope_query(&rule.name, &rule.scope)?;
    let record = ctx.awards.record_award(&query).await?;
    info!(rule = %rule.name, amount = record.amount, "achievement awarded");

    for replaced in &rule.replaces {
        let query = ctx.scope_query(replaced, &rule.scope)?;
        ctx.awards.retract_award(&query).await?;
        info!(rule = %rule.name, replaced = %replaced, "superseded award retracted");
    }

    Ok(record)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
