//! Recursive requirement evaluation.
//!
//! One evaluator walks the whole requirement tree: the fact-backed leaves
//! query their store and compare the observed amount, the combinators
//! recurse. Evaluation is purely a read -- no store is mutated, no state
//! survives the call -- so AND and AnyOf short-circuit freely. OneOf must
//! not: a second fulfilled child after the first flips the result, which
//! only evaluating past the first true child can detect.

use std::future::Future;
use std::pin::Pin;

use accolade_core::{AchievementRule, AmountCondition, Requirement};
use tracing::debug;

use crate::context::EvalContext;
use crate::error::{EvalError, FactKind};

/// Check a single requirement against the fact stores.
///
/// `scope` is the owning rule's scope list; it shapes every fact lookup
/// the tree performs. The future is boxed because combinator variants
/// recurse through it.
pub fn is_fulfilled<'a>(
    requirement: &'a Requirement,
    ctx: &'a EvalContext<'a>,
    scope: &'a [String],
) -> Pin<Box<dyn Future<Output = Result<bool, EvalError>> + Send + 'a>> {
    Box::pin(async move {
        match requirement {
            Requirement::Achievement { name, amount } => {
                let query = ctx.scope_query(name, scope)?;
                let amounts: Vec<i64> = ctx
                    .awards
                    .find(&query)
                    .await?
                    .iter()
                    .map(|r| r.amount)
                    .collect();
                unique_amount(&amounts, FactKind::Award, name, amount)
            }
            Requirement::Xp { name, amount } => {
                let query = ctx.scope_query(name, scope)?;
                let amounts: Vec<i64> =
                    ctx.xp.find(&query).await?.iter().map(|r| r.amount).collect();
                unique_amount(&amounts, FactKind::Xp, name, amount)
            }
            Requirement::Event {
                name,
                amount,
                conditions,
            } => {
                let query = ctx.scope_query(name, scope)?;
                let events = ctx.events.find(&query).await?;
                // Every condition in the list must hold for an event to
                // count; an empty list keeps every matching event.
                let observed = events
                    .iter()
                    .filter(|event| conditions.iter().all(|c| c.evaluate(&event.attributes)))
                    .count() as i64;
                debug!(event = %name, observed, "event requirement");
                Ok(amount.evaluate(observed))
            }
            Requirement::AnyOf(children) => {
                for child in children {
                    if is_fulfilled(child, ctx, scope).await? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Requirement::OneOf(children) => {
                let mut fulfilled = false;
                for child in children {
                    if is_fulfilled(child, ctx, scope).await? {
                        if fulfilled {
                            // Second fulfilled child: exactly-one fails.
                            return Ok(false);
                        }
                        fulfilled = true;
                    }
                }
                Ok(fulfilled)
            }
        }
    })
}

/// A rule's top-level requirement list is an implicit AND: every entry
/// must hold, checked in declaration order with early exit on the first
/// miss.
pub async fn rule_is_fulfilled(
    rule: &AchievementRule,
    ctx: &EvalContext<'_>,
) -> Result<bool, EvalError> {
    for requirement in &rule.requirements {
        if !is_fulfilled(requirement, ctx, &rule.scope).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Zero / one / many handling shared by the unique-record fact streams.
///
/// Zero matches is a legitimate not-fulfilled outcome. More than one match
/// means the store's uniqueness invariant is broken upstream.
fn unique_amount(
    amounts: &[i64],
    kind: FactKind,
    name: &str,
    condition: &AmountCondition,
) -> Result<bool, EvalError> {
    match amounts {
        [] => Ok(false),
        [observed] => Ok(condition.evaluate(*observed)),
        many => Err(EvalError::Integrity {
            kind,
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use accolade_core::Requirement;
    use accolade_storage::{
        AwardStore, EventRecord, EventStore, FactQuery, MemoryStore, StoreError, XpRecord,
        XpStore,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn xp_requirement(spec: &str) -> Requirement {
        Requirement::parse(&json!({"xp": "XP", "amount": spec})).unwrap()
    }

    async fn seed_xp(store: &MemoryStore, subject: &str, name: &str, amount: i64) {
        store
            .grant_xp(&FactQuery::for_subject(subject, name), amount)
            .await
            .unwrap();
    }

    async fn seed_event(
        store: &MemoryStore,
        subject: &str,
        name: &str,
        attributes: BTreeMap<String, serde_json::Value>,
    ) {
        store
            .append(EventRecord {
                subject: subject.to_string(),
                name: name.to_string(),
                attributes,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn xp_threshold_is_inclusive() {
        let store = MemoryStore::new();
        seed_xp(&store, "u1", "XP", 9).await;
        let ctx = EvalContext::new("u1", &store, &store, &store);
        let req = xp_requirement(">= 10");
        let scope = vec!["subject_id".to_string()];

        assert!(!is_fulfilled(&req, &ctx, &scope).await.unwrap());

        seed_xp(&store, "u1", "XP", 1).await;
        assert!(is_fulfilled(&req, &ctx, &scope).await.unwrap());
    }

    #[tokio::test]
    async fn zero_matches_is_not_fulfilled_not_an_error() {
        let store = MemoryStore::new();
        let ctx = EvalContext::new("u1", &store, &store, &store);
        let scope = vec!["subject_id".to_string()];

        let req = Requirement::parse(&json!({"achievement": "Ghost"})).unwrap();
        assert!(!is_fulfilled(&req, &ctx, &scope).await.unwrap());
    }

    #[tokio::test]
    async fn achievement_requirement_reads_the_award_amount() {
        let store = MemoryStore::new();
        let query = FactQuery::for_subject("u1", "First");
        store.record_award(&query).await.unwrap();
        store.record_award(&query).await.unwrap();

        let ctx = EvalContext::new("u1", &store, &store, &store);
        let scope = vec!["subject_id".to_string()];

        let two = Requirement::parse(&json!({"achievement": "First", "amount": "== 2"})).unwrap();
        assert!(is_fulfilled(&two, &ctx, &scope).await.unwrap());

        let three = Requirement::parse(&json!({"achievement": "First", "amount": ">= 3"})).unwrap();
        assert!(!is_fulfilled(&three, &ctx, &scope).await.unwrap());
    }

    #[tokio::test]
    async fn event_requirement_counts_condition_survivors() {
        let store = MemoryStore::new();
        let gold: BTreeMap<String, serde_json::Value> =
            [("tier".to_string(), json!("gold"))].into_iter().collect();
        let bronze: BTreeMap<String, serde_json::Value> =
            [("tier".to_string(), json!("bronze"))].into_iter().collect();
        seed_event(&store, "u1", "Purchase", gold.clone()).await;
        seed_event(&store, "u1", "Purchase", gold).await;
        seed_event(&store, "u1", "Purchase", bronze).await;

        let ctx = EvalContext::new("u1", &store, &store, &store);
        let scope = vec!["subject_id".to_string()];

        let req = Requirement::parse(&json!({
            "event": "Purchase",
            "amount": "== 2",
            "conditions": [
                {"AnyOf": [
                    {"parameter": "tier", "value": "gold"},
                    {"parameter": "tier", "value": "silver"},
                ]},
            ],
        }))
        .unwrap();
        assert!(is_fulfilled(&req, &ctx, &scope).await.unwrap());

        // Without conditions every matching event counts.
        let all = Requirement::parse(&json!({"event": "Purchase", "amount": "== 3"})).unwrap();
        assert!(is_fulfilled(&all, &ctx, &scope).await.unwrap());
    }

    #[tokio::test]
    async fn any_of_is_fulfilled_by_either_child() {
        let store = MemoryStore::new();
        seed_xp(&store, "u1", "Combat", 5).await;
        let ctx = EvalContext::new("u1", &store, &store, &store);
        let scope = vec!["subject_id".to_string()];

        let req = Requirement::parse(&json!({"AnyOf": [
            {"xp": "Crafting", "amount": ">= 5"},
            {"xp": "Combat", "amount": ">= 5"},
        ]}))
        .unwrap();
        assert!(is_fulfilled(&req, &ctx, &scope).await.unwrap());
    }

    #[tokio::test]
    async fn one_of_rejects_zero_and_two_fulfilled_children() {
        let store = MemoryStore::new();
        let ctx = EvalContext::new("u1", &store, &store, &store);
        let scope = vec!["subject_id".to_string()];
        let req = Requirement::parse(&json!({"OneOf": [
            {"xp": "Combat", "amount": ">= 5"},
            {"xp": "Crafting", "amount": ">= 5"},
        ]}))
        .unwrap();

        // Neither fulfilled.
        assert!(!is_fulfilled(&req, &ctx, &scope).await.unwrap());

        seed_xp(&store, "u1", "Combat", 5).await;
        assert!(is_fulfilled(&req, &ctx, &scope).await.unwrap());

        // Both fulfilled -> exactly-one fails.
        seed_xp(&store, "u1", "Crafting", 5).await;
        assert!(!is_fulfilled(&req, &ctx, &scope).await.unwrap());
    }

    #[tokio::test]
    async fn rule_requirement_list_is_an_and() {
        let store = MemoryStore::new();
        seed_xp(&store, "u1", "Combat", 10).await;
        let ctx = EvalContext::new("u1", &store, &store, &store);

        let rule = accolade_core::AchievementRule::parse(
            "Both",
            &json!({"requirements": [
                {"xp": "Combat", "amount": ">= 10"},
                {"xp": "Crafting", "amount": ">= 10"},
            ]}),
        )
        .unwrap();
        assert!(!rule_is_fulfilled(&rule, &ctx).await.unwrap());

        seed_xp(&store, "u1", "Crafting", 10).await;
        assert!(rule_is_fulfilled(&rule, &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn empty_requirement_list_is_vacuously_fulfilled() {
        let store = MemoryStore::new();
        let ctx = EvalContext::new("u1", &store, &store, &store);
        let rule = accolade_core::AchievementRule::parse("Free", &json!({})).unwrap();
        assert!(rule_is_fulfilled(&rule, &ctx).await.unwrap());
    }

    /// An XP store whose uniqueness invariant is broken: two records for
    /// the same (subject, name).
    struct DuplicatedXp;

    #[async_trait]
    impl XpStore for DuplicatedXp {
        async fn find(&self, query: &FactQuery) -> Result<Vec<XpRecord>, StoreError> {
            Ok(vec![
                XpRecord {
                    subject: "u1".to_string(),
                    name: query.name.clone(),
                    amount: 10,
                },
                XpRecord {
                    subject: "u1".to_string(),
                    name: query.name.clone(),
                    amount: 12,
                },
            ])
        }

        async fn grant_xp(&self, _query: &FactQuery, _amount: i64) -> Result<XpRecord, StoreError> {
            Err(StoreError::Backend("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn duplicate_unique_records_raise_integrity() {
        let store = MemoryStore::new();
        let broken = DuplicatedXp;
        let ctx = EvalContext::new("u1", &store, &broken, &store);
        let scope = vec!["subject_id".to_string()];

        let err = is_fulfilled(&xp_requirement(">= 1"), &ctx, &scope)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::Integrity {
                kind: FactKind::Xp,
                name: "XP".to_string(),
                count: 2,
            }
        );
    }
}
