//! Per-evaluation context: subject identity and fact-store handles.

use std::collections::BTreeMap;

use accolade_storage::{AwardStore, EventStore, FactQuery, XpStore, SUBJECT_KEY};

use crate::error::EvalError;

/// Everything one evaluation call needs: who the subject is, any extra
/// scope-key values, and the three fact-store collaborators.
///
/// The context is never mutated, so a single value can back concurrent
/// evaluations of different rules for the same incoming event.
pub struct EvalContext<'a> {
    pub subject: &'a str,
    /// Scope-key values beyond the subject (e.g. `team_id`), for rules
    /// whose scope is wider than the default.
    pub scope_values: BTreeMap<String, String>,
    pub awards: &'a dyn AwardStore,
    pub xp: &'a dyn XpStore,
    pub events: &'a dyn EventStore,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        subject: &'a str,
        awards: &'a dyn AwardStore,
        xp: &'a dyn XpStore,
        events: &'a dyn EventStore,
    ) -> EvalContext<'a> {
        EvalContext {
            subject,
            scope_values: BTreeMap::new(),
            awards,
            xp,
            events,
        }
    }

    /// Attach an extra scope-key value (builder style).
    pub fn with_scope_value(mut self, key: &str, value: &str) -> EvalContext<'a> {
        self.scope_values.insert(key.to_string(), value.to_string());
        self
    }

    /// Resolve a rule's scope list into a query for the given fact name.
    ///
    /// `subject_id` resolves to the subject; any other key must be present
    /// in `scope_values`. An unresolvable key fails the evaluation rather
    /// than silently issuing a wider query.
    pub fn scope_query(&self, name: &str, scope: &[String]) -> Result<FactQuery, EvalError> {
        let mut keys = BTreeMap::new();
        for key in scope {
            let value = if key == SUBJECT_KEY {
                self.subject.to_string()
            } else {
                self.scope_values
                    .get(key)
                    .cloned()
                    .ok_or_else(|| EvalError::MissingScopeValue { key: key.clone() })?
            };
            keys.insert(key.clone(), value);
        }
        Ok(FactQuery {
            name: name.to_string(),
            keys,
        })
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
