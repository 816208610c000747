// Persistence boundary for fraud cases.
//
// CaseStore is the only seam the pipeline writes through. SupabaseStore talks
// to a PostgREST table; MemoryStore (feature = "test-support") backs tests
// with no network and no database.

pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod supabase;

pub use error::{Result, StoreError};
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use fraudscout_common::CaseRecord;

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Insert one record. A store-layer uniqueness conflict surfaces as
    /// `StoreError::Conflict` so the caller can treat it as a duplicate skip.
    async fn insert(&self, record: &CaseRecord) -> Result<()>;

    /// True if a record with this exact source URL already exists.
    async fn source_exists(&self, url: &str) -> Result<bool>;

    /// Event labels of the most recent records, newest first, capped at
    /// `limit`. Input to the fuzzy title dedup scan.
    async fn recent_events(&self, limit: u32) -> Result<Vec<String>>;

    /// Source URLs of the most recent records, newest first, capped at
    /// `limit`. Input to watch-domain seeding.
    async fn source_urls(&self, limit: u32) -> Result<Vec<String>>;
}
