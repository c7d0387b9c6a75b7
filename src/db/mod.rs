//! Storage layer.
//!
//! Every backend implements [`ActivityStore`]; the rest of the crate only
//! sees `Arc<dyn ActivityStore>`.

pub mod firestore;
pub mod local;
pub mod memory;
pub mod remote;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use firestore::FirestoreDb;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;

use crate::error::Result;
use crate::models::{ActivityKind, ActivityRecord};

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
}

/// Persistence for activity records.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Store a new record.
    ///
    /// Fails with `DuplicateKey` when a record with the same document ID
    /// (for imports, the same external ID) already exists.
    async fn insert(&self, record: &ActivityRecord) -> Result<()>;

    /// Records of `kind` dated within `[start, end]`, ascending by date.
    async fn query(
        &self,
        kind: ActivityKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ActivityRecord>>;

    /// Look up an imported record by its source ID.
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<ActivityRecord>>;

    /// Delete every record. Returns the number removed.
    async fn clear(&self) -> Result<usize>;
}

/// Sort records the way `query` must return them.
pub(crate) fn sort_records(records: &mut [ActivityRecord]) {
    records.sort_by(|a, b| a.date.cmp(&b.date).then(a.logged_at.cmp(&b.logged_at)));
}
