//! Requirement trees -- the polymorphic predicate behind an achievement rule.
//!
//! Five variants, one sum type, one exhaustive match everywhere: the three
//! fact-backed leaves carry a name to match in their fact stream plus an
//! amount condition, the two combinators own their children exclusively.
//! Trees are built bottom-up at parse time and never mutated afterwards.

use crate::amount::AmountCondition;
use crate::condition::EventCondition;
use crate::error::ConfigError;

/// One node of a requirement tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    /// Prior awards of another achievement, by running award amount.
    Achievement { name: String, amount: AmountCondition },
    /// Accumulated experience points under an XP name.
    Xp { name: String, amount: AmountCondition },
    /// Count of logged events that pass every condition in the list.
    ///
    /// An empty condition list keeps every matching event.
    Event {
        name: String,
        amount: AmountCondition,
        conditions: Vec<EventCondition>,
    },
    /// At least one child fulfilled.
    AnyOf(Vec<Requirement>),
    /// Exactly one child fulfilled.
    OneOf(Vec<Requirement>),
}

impl Requirement {
    /// Parse a requirement definition.
    ///
    /// Dispatch keys on which of `achievement` / `xp` / `event` / `AnyOf` /
    /// `OneOf` is present in the definition map. A definition carrying none
    /// of them is rejected with the raw definition in the error.
    pub fn parse(v: &serde_json::Value) -> Result<Requirement, ConfigError> {
        let obj = v
            .as_object()
            .ok_or_else(|| ConfigError::InvalidRequirement {
                definition: v.to_string(),
            })?;

        if let Some(name) = obj.get("achievement").and_then(|n| n.as_str()) {
            return Ok(Requirement::Achievement {
                name: name.to_string(),
                amount: parse_amount(obj)?,
            });
        }
        if let Some(name) = obj.get("xp").and_then(|n| n.as_str()) {
            return Ok(Requirement::Xp {
                name: name.to_string(),
                amount: parse_amount(obj)?,
            });
        }
        if let Some(name) = obj.get("event").and_then(|n| n.as_str()) {
            let conditions = match obj.get("conditions") {
                Some(c) => {
                    let arr = c.as_array().ok_or_else(|| ConfigError::InvalidRequirement {
                        definition: v.to_string(),
                    })?;
                    arr.iter()
                        .map(EventCondition::parse)
                        .collect::<Result<Vec<_>, _>>()?
                }
                None => Vec::new(),
            };
            return Ok(Requirement::Event {
                name: name.to_string(),
                amount: parse_amount(obj)?,
                conditions,
            });
        }
        if let Some(children) = obj.get("AnyOf") {
            return Ok(Requirement::AnyOf(parse_children(children)?));
        }
        if let Some(children) = obj.get("OneOf") {
            return Ok(Requirement::OneOf(parse_children(children)?));
        }
        Err(ConfigError::InvalidRequirement {
            definition: v.to_string(),
        })
    }
}

fn parse_amount(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Result<AmountCondition, ConfigError> {
    match obj.get("amount") {
        Some(spec) => AmountCondition::parse(spec),
        None => Ok(AmountCondition::default()),
    }
}

fn parse_children(v: &serde_json::Value) -> Result<Vec<Requirement>, ConfigError> {
    let arr = v
        .as_array()
        .ok_or_else(|| ConfigError::InvalidRequirement {
            definition: v.to_string(),
        })?;
    arr.iter().map(Requirement::parse).collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
