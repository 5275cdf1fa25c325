//! Achievement rules -- a requirement tree plus award policy.

use crate::error::ConfigError;
use crate::requirement::Requirement;

/// The scope key every rule carries unless it says otherwise: awards are
/// grouped per subject.
pub const DEFAULT_SCOPE_KEY: &str = "subject_id";

/// A named achievement rule: its requirement tree and award policy.
///
/// Rules are immutable once parsed and live for the process lifetime; a
/// reload builds a fresh catalogue value and swaps it at the call site.
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementRule {
    /// Unique key within the catalogue.
    pub name: String,
    /// Implicit AND, in declaration order.
    pub requirements: Vec<Requirement>,
    /// Rules whose awards this one supersedes once granted.
    pub replaces: Vec<String>,
    /// Cap on awards within one scope.
    pub max_awarded: i64,
    /// Attribute names defining the granularity of the cap and of fact
    /// lookups.
    pub scope: Vec<String>,
    /// Opaque post-award action descriptors; never interpreted here.
    pub actions: Vec<serde_json::Value>,
    /// Display-only flag; evaluation ignores it.
    pub hidden: bool,
}

impl AchievementRule {
    /// Parse one rule definition from the document.
    ///
    /// Absent fields take the documented defaults: no requirements, no
    /// replacements, cap 1, subject scope, no actions, not hidden.
    pub fn parse(name: &str, definition: &serde_json::Value) -> Result<AchievementRule, ConfigError> {
        let obj = definition
            .as_object()
            .ok_or_else(|| invalid(name, "definition must be a mapping"))?;

        let requirements = match obj.get("requirements") {
            Some(serde_json::Value::Array(entries)) => entries
                .iter()
                .map(Requirement::parse)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(invalid(name, "requirements must be a list")),
            None => Vec::new(),
        };

        let replaces = string_list(obj, "replaces", name)?.unwrap_or_default();

        let max_awarded = match obj.get("maxAwarded") {
            Some(v) => v
                .as_i64()
                .ok_or_else(|| invalid(name, "maxAwarded must be an integer"))?,
            None => 1,
        };

        let scope = string_list(obj, "scope", name)?
            .unwrap_or_else(|| vec![DEFAULT_SCOPE_KEY.to_string()]);

        let actions = match obj.get("actions") {
            Some(serde_json::Value::Array(entries)) => entries.clone(),
            Some(_) => return Err(invalid(name, "actions must be a list")),
            None => Vec::new(),
        };

        let hidden = match obj.get("hidden") {
            Some(v) => v
                .as_bool()
                .ok_or_else(|| invalid(name, "hidden must be a boolean"))?,
            None => false,
        };

        Ok(AchievementRule {
            name: name.to_string(),
            requirements,
            replaces,
            max_awarded,
            scope,
            actions,
            hidden,
        })
    }
}

fn invalid(rule: &str, message: &str) -> ConfigError {
    ConfigError::InvalidRule {
        rule: rule.to_string(),
        message: message.to_string(),
    }
}

/// Read an optional list-of-strings field. `None` means the field is absent.
fn string_list(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &str,
    rule: &str,
) -> Result<Option<Vec<String>>, ConfigError> {
    match obj.get(field) {
        Some(serde_json::Value::Array(entries)) => {
            let mut out = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => {
                        return Err(invalid(rule, &format!("{} must be a list of strings", field)));
                    }
                }
            }
            Ok(Some(out))
        }
        Some(_) => Err(invalid(rule, &format!("{} must be a list of strings", field))),
        None => Ok(None),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
