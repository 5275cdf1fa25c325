//! The three fact-store traits the evaluator reads through.
//!
//! One trait per fact stream. All methods are async -- backends are
//! expected to sit on a database or remote service -- and every
//! implementation must be `Send + Sync` so one store instance can back
//! concurrent evaluations.
//!
//! ## Uniqueness
//!
//! Award and XP records are unique per (scope keys, name). The stores are
//! expected to enforce that (the reference backend and any database
//! implementation index on it); the evaluator treats a duplicate as a
//! consistency bug and refuses to pick a winner.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{AwardRecord, EventRecord, FactQuery, XpRecord};

/// The award-record store: prior grants, plus the two mutations the
/// evaluator performs after a rule passes its checks.
#[async_trait]
pub trait AwardStore: Send + Sync {
    /// All award records matching the query's name and every scope key.
    async fn find(&self, query: &FactQuery) -> Result<Vec<AwardRecord>, StoreError>;

    /// Record one award under the query's scope keys.
    ///
    /// Inserts a record with amount 1, or increments the running amount of
    /// the existing unique record. Returns the post-write record.
    async fn record_award(&self, query: &FactQuery) -> Result<AwardRecord, StoreError>;

    /// Zero out the running amounts of matching records (replacement).
    ///
    /// Retracting a never-awarded rule is a no-op, not an error.
    async fn retract_award(&self, query: &FactQuery) -> Result<(), StoreError>;
}

/// The experience-point ledger, unique per (subject, name).
#[async_trait]
pub trait XpStore: Send + Sync {
    /// All XP records matching the query's subject and name.
    async fn find(&self, query: &FactQuery) -> Result<Vec<XpRecord>, StoreError>;

    /// Accumulate `amount` onto the subject's ledger entry for the name,
    /// creating it if absent. Returns the post-write record.
    ///
    /// The evaluator itself never calls this; it exists for action
    /// implementations and event-ingest layers that grant XP.
    async fn grant_xp(&self, query: &FactQuery, amount: i64) -> Result<XpRecord, StoreError>;
}

/// The append-only domain event log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events matching the query's subject and name, in append order.
    async fn find(&self, query: &FactQuery) -> Result<Vec<EventRecord>, StoreError>;

    /// Append one event.
    async fn append(&self, event: EventRecord) -> Result<(), StoreError>;
}
