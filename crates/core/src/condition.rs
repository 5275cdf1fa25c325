//! Event condition trees -- predicates over a single event's attributes.
//!
//! A condition tree is validated once, when the owning rule is parsed.
//! Evaluation can therefore never meet a malformed node; it is a pure
//! recursive walk over the event's attribute map.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// One node of an event condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum EventCondition {
    /// True iff the named attribute equals the expected value exactly.
    Equals {
        parameter: String,
        value: serde_json::Value,
    },
    /// True iff at least one child is true.
    AnyOf(Vec<EventCondition>),
    /// True iff exactly one child is true.
    OneOf(Vec<EventCondition>),
}

impl EventCondition {
    /// Parse a condition node from its document form.
    ///
    /// Dispatches on which of `parameter` / `AnyOf` / `OneOf` is present;
    /// a node with none of them is rejected with the raw definition in the
    /// error.
    pub fn parse(v: &serde_json::Value) -> Result<EventCondition, ConfigError> {
        let obj = v
            .as_object()
            .ok_or_else(|| ConfigError::InvalidCondition {
                definition: v.to_string(),
            })?;

        if let Some(parameter) = obj.get("parameter").and_then(|p| p.as_str()) {
            let value = obj
                .get("value")
                .cloned()
                .ok_or_else(|| ConfigError::InvalidCondition {
                    definition: v.to_string(),
                })?;
            return Ok(EventCondition::Equals {
                parameter: parameter.to_string(),
                value,
            });
        }
        if let Some(children) = obj.get("AnyOf") {
            return Ok(EventCondition::AnyOf(parse_children(children)?));
        }
        if let Some(children) = obj.get("OneOf") {
            return Ok(EventCondition::OneOf(parse_children(children)?));
        }
        Err(ConfigError::InvalidCondition {
            definition: v.to_string(),
        })
    }

    /// Evaluate against one event's attribute map.
    ///
    /// Equality is exact `serde_json::Value` equality -- no coercion. A
    /// missing attribute compares unequal; it never errors.
    pub fn evaluate(&self, attributes: &BTreeMap<String, serde_json::Value>) -> bool {
        match self {
            EventCondition::Equals { parameter, value } => {
                attributes.get(parameter) == Some(value)
            }
            EventCondition::AnyOf(children) => {
                // OR: the first true child settles it.
                children.iter().any(|c| c.evaluate(attributes))
            }
            EventCondition::OneOf(children) => {
                // Exactly one: a second true child invalidates the result,
                // so every child is evaluated.
                children.iter().filter(|c| c.evaluate(attributes)).count() == 1
            }
        }
    }
}

fn parse_children(v: &serde_json::Value) -> Result<Vec<EventCondition>, ConfigError> {
    let arr = v.as_array().ok_or_else(|| ConfigError::InvalidCondition {
        definition: v.to_string(),
    })?;
    arr.iter().map(EventCondition::parse).collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(pairs: &[(&str, serde_json::Value)]) -> BTreeMap<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn leaf_matches_exact_value() {
        let cond = EventCondition::parse(&json!({"parameter": "tier", "value": "gold"})).unwrap();
        assert!(cond.evaluate(&attrs(&[("tier", json!("gold"))])));
        assert!(!cond.evaluate(&attrs(&[("tier", json!("silver"))])));
    }

    #[test]
    fn missing_attribute_compares_unequal() {
        let cond = EventCondition::parse(&json!({"parameter": "tier", "value": "gold"})).unwrap();
        assert!(!cond.evaluate(&attrs(&[])));
    }

    #[test]
    fn equality_is_not_coerced() {
        let cond = EventCondition::parse(&json!({"parameter": "x", "value": 1})).unwrap();
        assert!(cond.evaluate(&attrs(&[("x", json!(1))])));
        assert!(!cond.evaluate(&attrs(&[("x", json!("1"))])));
        assert!(!cond.evaluate(&attrs(&[("x", json!(1.0))])));
    }

    #[test]
    fn any_of_is_or() {
        let cond = EventCondition::parse(&json!({"AnyOf": [
            {"parameter": "tier", "value": "gold"},
            {"parameter": "tier", "value": "silver"},
        ]}))
        .unwrap();
        assert!(cond.evaluate(&attrs(&[("tier", json!("gold"))])));
        assert!(cond.evaluate(&attrs(&[("tier", json!("silver"))])));
        assert!(!cond.evaluate(&attrs(&[("tier", json!("bronze"))])));
    }

    #[test]
    fn one_of_requires_exactly_one() {
        let cond = EventCondition::parse(&json!({"OneOf": [
            {"parameter": "x", "value": 1},
            {"parameter": "y", "value": 2},
        ]}))
        .unwrap();
        assert!(cond.evaluate(&attrs(&[("x", json!(1)), ("y", json!(3))])));
        assert!(cond.evaluate(&attrs(&[("x", json!(0)), ("y", json!(2))])));
        // Both true -> false.
        assert!(!cond.evaluate(&attrs(&[("x", json!(1)), ("y", json!(2))])));
        // Neither true -> false.
        assert!(!cond.evaluate(&attrs(&[("x", json!(0)), ("y", json!(0))])));
    }

    #[test]
    fn combinators_nest() {
        let cond = EventCondition::parse(&json!({"AnyOf": [
            {"OneOf": [
                {"parameter": "a", "value": 1},
                {"parameter": "b", "value": 1},
            ]},
            {"parameter": "c", "value": true},
        ]}))
        .unwrap();
        assert!(cond.evaluate(&attrs(&[("a", json!(1))])));
        assert!(cond.evaluate(&attrs(&[("c", json!(true))])));
        // Inner OneOf sees two true children and fails; outer falls through.
        assert!(!cond.evaluate(&attrs(&[("a", json!(1)), ("b", json!(1))])));
    }

    #[test]
    fn malformed_node_fails_at_parse_time() {
        assert!(matches!(
            EventCondition::parse(&json!({"neither": "nor"})),
            Err(ConfigError::InvalidCondition { .. })
        ));
        assert!(matches!(
            EventCondition::parse(&json!("just a string")),
            Err(ConfigError::InvalidCondition { .. })
        ));
        // A leaf without a value is malformed, not "equals null".
        assert!(matches!(
            EventCondition::parse(&json!({"parameter": "tier"})),
            Err(ConfigError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn malformed_child_fails_the_whole_branch() {
        assert!(EventCondition::parse(&json!({"AnyOf": [
            {"parameter": "a", "value": 1},
            {"bogus": true},
        ]}))
        .is_err());
    }
}
