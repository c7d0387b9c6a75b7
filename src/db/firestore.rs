// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! All records live in a single `activities` collection. Manual records get
//! a time-based document ID; imported records use their external ID, so a
//! second import of the same activity fails at insert time.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::{collections, sort_records, ActivityStore};
use crate::error::AppError;
use crate::models::{ActivityKind, ActivityRecord};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

// ─── Activity Operations ─────────────────────────────────────

#[async_trait]
impl ActivityStore for FirestoreDb {
    /// Create the document; never overwrites.
    async fn insert(&self, record: &ActivityRecord) -> Result<(), AppError> {
        record.validate()?;
        let doc_id = record.document_id();

        let result: Result<(), firestore::errors::FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::ACTIVITIES)
            .document_id(&doc_id)
            .object(record)
            .execute()
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(doc_id, kind = %record.kind, "Stored activity");
                Ok(())
            }
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                Err(AppError::DuplicateKey(doc_id))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn query(
        &self,
        kind: ActivityKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityRecord>, AppError> {
        // Dates are stored as ISO strings, which sort chronologically.
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();

        let mut records: Vec<ActivityRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(|q| {
                q.for_all([
                    q.field("kind").eq(kind.as_str()),
                    q.field("date").greater_than_or_equal(start.clone()),
                    q.field("date").less_than_or_equal(end.clone()),
                ])
            })
            .order_by([("date", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sort_records(&mut records);
        Ok(records)
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<ActivityRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(&ActivityRecord::external_document_id(external_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn clear(&self) -> Result<usize, AppError> {
        let records: Vec<ActivityRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = records.len();
        self.batch_delete(&records, collections::ACTIVITIES, |r: &ActivityRecord| {
            r.document_id()
        })
        .await?;

        tracing::info!(count, "Cleared activities collection");
        Ok(count)
    }
}
