//! In-memory case store for tests. No network, no database.

use std::sync::Mutex;

use async_trait::async_trait;

use fraudscout_common::CaseRecord;

use crate::error::{Result, StoreError};
use crate::CaseStore;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<CaseRecord>>,
    /// Mimic a store-layer unique constraint on `source_url`.
    enforce_unique_urls: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject inserts whose `source_url` already exists, the way a
    /// constraint-bearing deployment would.
    pub fn with_unique_urls() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            enforce_unique_urls: true,
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Vec<CaseRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaseStore for MemoryStore {
    async fn insert(&self, record: &CaseRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if self.enforce_unique_urls
            && records.iter().any(|r| r.source_url == record.source_url)
        {
            return Err(StoreError::Conflict(record.source_url.clone()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn source_exists(&self, url: &str) -> Result<bool> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.source_url == url))
    }

    async fn recent_events(&self, limit: u32) -> Result<Vec<String>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .take(limit as usize)
            .map(|r| r.event.clone())
            .collect())
    }

    async fn source_urls(&self, limit: u32) -> Result<Vec<String>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .take(limit as usize)
            .map(|r| r.source_url.clone())
            .collect())
    }
}
