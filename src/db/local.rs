// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-file JSON store used by the CLI in local mode.
//!
//! The whole file is read and rewritten under a lock on every write. That
//! is fine for one person's exercise log.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::db::{sort_records, ActivityStore};
use crate::error::{AppError, Result};
use crate::models::{ActivityKind, ActivityRecord};

type Documents = BTreeMap<String, ActivityRecord>;

/// JSON file store.
pub struct LocalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStore {
    /// Open (or prepare to create) the store at `path`.
    ///
    /// The parent directory is created if needed; the file itself is
    /// written on the first insert.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Database(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        tracing::debug!(path = %path.display(), "Opened local store");
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Documents> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Documents::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Database(format!("Corrupt store {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Documents::new()),
            Err(e) => Err(AppError::Database(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, docs: &Documents) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(docs)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize store: {}", e)))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| AppError::Database(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::Database(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl ActivityStore for LocalStore {
    async fn insert(&self, record: &ActivityRecord) -> Result<()> {
        record.validate()?;
        let _guard = self.lock.lock().await;
        let mut docs = self.load().await?;
        let id = record.document_id();
        if docs.contains_key(&id) {
            return Err(AppError::DuplicateKey(id));
        }
        docs.insert(id, record.clone());
        self.save(&docs).await
    }

    async fn query(
        &self,
        kind: ActivityKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityRecord>> {
        let _guard = self.lock.lock().await;
        let mut records: Vec<ActivityRecord> = self
            .load()
            .await?
            .into_values()
            .filter(|r| r.kind == kind && r.date >= start && r.date <= end)
            .collect();
        sort_records(&mut records);
        Ok(records)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<ActivityRecord>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .into_values()
            .find(|r| r.external_id.as_deref() == Some(external_id)))
    }

    async fn clear(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let count = self.load().await?.len();
        self.save(&Documents::new()).await?;
        tracing::info!(path = %self.path.display(), count, "Cleared local store");
        Ok(count)
    }
}
