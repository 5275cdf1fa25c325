//! Rule catalogue -- loading a rule document into evaluatable rules.
//!
//! The loader receives an already-read document (JSON value, or YAML text
//! via [`RuleCatalogue::from_yaml_str`]); fetching it from disk or network
//! is an external collaborator's job. Individual rules parse independently:
//! one malformed rule is recorded and skipped, it never silently takes the
//! rest of the catalogue down with it.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::rule::AchievementRule;

/// An immutable mapping of rule name to [`AchievementRule`], iterated in
/// document order.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalogue {
    rules: Vec<AchievementRule>,
    index: HashMap<String, usize>,
}

/// What a load produced: the catalogue plus the rules it had to reject.
#[derive(Debug)]
pub struct LoadOutcome {
    pub catalogue: RuleCatalogue,
    /// One [`ConfigError::InRule`] per rejected rule, in document order.
    pub rejected: Vec<ConfigError>,
}

impl LoadOutcome {
    /// For callers that treat any malformed rule as fatal: the catalogue if
    /// nothing was rejected, otherwise the first rejection.
    pub fn strict(self) -> Result<RuleCatalogue, ConfigError> {
        match self.rejected.into_iter().next() {
            None => Ok(self.catalogue),
            Some(error) => Err(error),
        }
    }
}

impl RuleCatalogue {
    /// Parse a rule document.
    ///
    /// The top level must be a mapping with an `achievements` key; that
    /// shape failing is fatal. Each achievement entry then parses on its
    /// own, and failures land in [`LoadOutcome::rejected`] wrapped with the
    /// offending rule's name.
    pub fn parse(document: &serde_json::Value) -> Result<LoadOutcome, ConfigError> {
        let achievements = document
            .get("achievements")
            .and_then(|a| a.as_object())
            .ok_or_else(|| ConfigError::Document {
                message: "top level must be a mapping with an 'achievements' key".to_string(),
            })?;

        let mut rules = Vec::with_capacity(achievements.len());
        let mut index = HashMap::with_capacity(achievements.len());
        let mut rejected = Vec::new();

        for (name, definition) in achievements {
            match AchievementRule::parse(name, definition) {
                Ok(rule) => {
                    index.insert(name.clone(), rules.len());
                    rules.push(rule);
                }
                Err(error) => rejected.push(ConfigError::InRule {
                    rule: name.clone(),
                    error: Box::new(error),
                }),
            }
        }

        Ok(LoadOutcome {
            catalogue: RuleCatalogue { rules, index },
            rejected,
        })
    }

    /// Convenience for the YAML source format.
    pub fn from_yaml_str(source: &str) -> Result<LoadOutcome, ConfigError> {
        let document: serde_json::Value =
            serde_yaml::from_str(source).map_err(|e| ConfigError::Document {
                message: format!("invalid YAML: {}", e),
            })?;
        RuleCatalogue::parse(&document)
    }

    pub fn get(&self, name: &str) -> Option<&AchievementRule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    /// All rules, in document order.
    pub fn rules(&self) -> impl Iterator<Item = &AchievementRule> {
        self.rules.iter()
    }

    /// The rules a display layer should list.
    pub fn visible(&self) -> impl Iterator<Item = &AchievementRule> {
        self.rules.iter().filter(|r| !r.hidden)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
