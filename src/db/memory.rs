// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by a concurrent map.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::db::{sort_records, ActivityStore};
use crate::error::{AppError, Result};
use crate::models::{ActivityKind, ActivityRecord};

/// Records keyed by document ID.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, ActivityRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn insert(&self, record: &ActivityRecord) -> Result<()> {
        record.validate()?;
        match self.records.entry(record.document_id()) {
            Entry::Occupied(e) => Err(AppError::DuplicateKey(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn query(
        &self,
        kind: ActivityKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityRecord>> {
        let mut records: Vec<ActivityRecord> = self
            .records
            .iter()
            .filter(|r| r.kind == kind && r.date >= start && r.date <= end)
            .map(|r| r.value().clone())
            .collect();
        sort_records(&mut records);
        Ok(records)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<ActivityRecord>> {
        Ok(self
            .records
            .iter()
            .find(|r| r.external_id.as_deref() == Some(external_id))
            .map(|r| r.value().clone()))
    }

    async fn clear(&self) -> Result<usize> {
        let count = self.records.len();
        self.records.clear();
        Ok(count)
    }
}
