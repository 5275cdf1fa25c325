//! In-memory reference store.
//!
//! Implements all three fact-store traits over mutex-guarded vectors.
//! Awards and XP keep one record per unique key with a running amount;
//! events are an append-only list. Useful for tests and for embedding
//! scenarios where the facts live in-process. Read-your-writes holds by
//! construction.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::trace;

use crate::error::StoreError;
use crate::record::{AwardRecord, EventRecord, FactQuery, XpRecord, SUBJECT_KEY};
use crate::traits::{AwardStore, EventStore, XpStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    awards: Mutex<Vec<AwardRecord>>,
    xp: Mutex<Vec<XpRecord>>,
    events: Mutex<Vec<EventRecord>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
}

fn now_rfc3339() -> Result<String, StoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| StoreError::Backend(format!("timestamp formatting failed: {}", e)))
}

#[async_trait]
impl AwardStore for MemoryStore {
    async fn find(&self, query: &FactQuery) -> Result<Vec<AwardRecord>, StoreError> {
        let awards = lock(&self.awards)?;
        Ok(awards.iter().filter(|r| r.matches(query)).cloned().collect())
    }

    async fn record_award(&self, query: &FactQuery) -> Result<AwardRecord, StoreError> {
        let mut awards = lock(&self.awards)?;
        let awarded_at = now_rfc3339()?;

        if let Some(existing) = awards.iter_mut().find(|r| r.matches(query)) {
            existing.amount += 1;
            existing.awarded_at = awarded_at;
            trace!(name = %query.name, amount = existing.amount, "award incremented");
            return Ok(existing.clone());
        }

        let record = AwardRecord {
            name: query.name.clone(),
            amount: 1,
            scope: query.keys.clone(),
            awarded_at,
        };
        trace!(name = %query.name, "award recorded");
        awards.push(record.clone());
        Ok(record)
    }

    async fn retract_award(&self, query: &FactQuery) -> Result<(), StoreError> {
        let mut awards = lock(&self.awards)?;
        for record in awards.iter_mut().filter(|r| r.matches(query)) {
            record.amount = 0;
            trace!(name = %query.name, "award retracted");
        }
        Ok(())
    }
}

#[async_trait]
impl XpStore for MemoryStore {
    async fn find(&self, query: &FactQuery) -> Result<Vec<XpRecord>, StoreError> {
        let xp = lock(&self.xp)?;
        Ok(xp.iter().filter(|r| r.matches(query)).cloned().collect())
    }

    async fn grant_xp(&self, query: &FactQuery, amount: i64) -> Result<XpRecord, StoreError> {
        let subject = query.subject().ok_or_else(|| StoreError::MissingKey {
            name: query.name.clone(),
            key: SUBJECT_KEY.to_string(),
        })?;
        let mut xp = lock(&self.xp)?;

        if let Some(existing) = xp
            .iter_mut()
            .find(|r| r.subject == subject && r.name == query.name)
        {
            existing.amount += amount;
            trace!(name = %query.name, amount = existing.amount, "xp accumulated");
            return Ok(existing.clone());
        }

        let record = XpRecord {
            subject: subject.to_string(),
            name: query.name.clone(),
            amount,
        };
        trace!(name = %query.name, amount, "xp ledger entry created");
        xp.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn find(&self, query: &FactQuery) -> Result<Vec<EventRecord>, StoreError> {
        let events = lock(&self.events)?;
        Ok(events.iter().filter(|r| r.matches(query)).cloned().collect())
    }

    async fn append(&self, event: EventRecord) -> Result<(), StoreError> {
        let mut events = lock(&self.events)?;
        trace!(name = %event.name, subject = %event.subject, "event appended");
        events.push(event);
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
