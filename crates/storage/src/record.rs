//! Record and query types shared by all fact stores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The scope key naming the subject. Present in every query produced by the
/// default rule scope.
pub const SUBJECT_KEY: &str = "subject_id";

/// A filter for fact lookups: the fact name plus scope-key values.
///
/// `keys` carries `subject_id` for subject-scoped rules; rules with a wider
/// scope contribute their extra keys verbatim. How a store matches the keys
/// is part of each trait's contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactQuery {
    pub name: String,
    pub keys: BTreeMap<String, String>,
}

impl FactQuery {
    /// A query scoped to a single subject -- the common case.
    pub fn for_subject(subject: &str, name: &str) -> FactQuery {
        let mut keys = BTreeMap::new();
        keys.insert(SUBJECT_KEY.to_string(), subject.to_string());
        FactQuery {
            name: name.to_string(),
            keys,
        }
    }

    /// The subject this query is scoped to, if any.
    pub fn subject(&self) -> Option<&str> {
        self.keys.get(SUBJECT_KEY).map(String::as_str)
    }
}

/// One awarded achievement, unique per (scope keys, name).
///
/// The record carries a running `amount` that increments on re-award and
/// zeroes on retraction; award history is the store's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub name: String,
    pub amount: i64,
    /// The scope-key values the award was granted under, `subject_id`
    /// included.
    pub scope: BTreeMap<String, String>,
    /// RFC 3339 timestamp of the most recent award.
    pub awarded_at: String,
}

impl AwardRecord {
    /// The subject the award belongs to, if it was granted under a
    /// subject-bearing scope.
    pub fn subject(&self) -> Option<&str> {
        self.scope.get(SUBJECT_KEY).map(String::as_str)
    }

    /// Whether this record satisfies every key of the query.
    pub fn matches(&self, query: &FactQuery) -> bool {
        self.name == query.name
            && query
                .keys
                .iter()
                .all(|(key, value)| self.scope.get(key) == Some(value))
    }
}

/// An accumulated experience-point ledger entry, unique per
/// (subject, name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpRecord {
    pub subject: String,
    pub name: String,
    pub amount: i64,
}

impl XpRecord {
    /// XP is a per-subject stream: the query's `subject_id` must match;
    /// any wider scope keys do not apply here and are ignored.
    pub fn matches(&self, query: &FactQuery) -> bool {
        self.name == query.name
            && query.subject().map_or(true, |s| s == self.subject)
    }
}

/// A raw domain event with its attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub subject: String,
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl EventRecord {
    /// Events are a per-subject stream; matching mirrors [`XpRecord::matches`].
    pub fn matches(&self, query: &FactQuery) -> bool {
        self.name == query.name
            && query.subject().map_or(true, |s| s == self.subject)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
