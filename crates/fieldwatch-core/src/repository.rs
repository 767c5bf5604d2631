//! Persistence collaborator trait and an in-memory implementation.
//!
//! This module defines the `ReportRepository` trait that every persistence
//! backend must satisfy.
//!
//! # Backends
//!
//! - `InMemoryRepository`: process-local store, used by the API server and tests
//! - `HttpReportRepository` (in `fieldwatch-client`): the REST resource

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::types::{DeleteSummary, NewRecord, Record, ReportId};
use crate::{Error, Result};

/// Remote keyed-record store holding the canonical report collection.
///
/// # Errors
///
/// Transport or storage failures surface as
/// [`Error::PersistenceUnavailable`]; `create` may also fail with
/// [`Error::Validation`] when required fields are missing.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Fetches every stored record.
    async fn list(&self) -> Result<Vec<Record>>;

    /// Stores a record and returns it with its assigned id.
    async fn create(&self, record: NewRecord) -> Result<Record>;

    /// Removes every stored record.
    async fn delete_all(&self) -> Result<DeleteSummary>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ReportRepository + ?Sized> ReportRepository for Arc<T> {
    async fn list(&self) -> Result<Vec<Record>> {
        (**self).list().await
    }

    async fn create(&self, record: NewRecord) -> Result<Record> {
        (**self).create(record).await
    }

    async fn delete_all(&self) -> Result<DeleteSummary> {
        (**self).delete_all().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Process-local repository.
///
/// Applies the same defaults and required-field checks as the REST resource.
/// It can be switched unavailable and given artificial fetch and save delays,
/// which the sync tests use to simulate outages and slow responses.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: Mutex<Vec<Record>>,
    unavailable: AtomicBool,
    list_delay_ms: AtomicU64,
    create_delay_ms: AtomicU64,
    list_calls: AtomicU64,
    create_calls: AtomicU64,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding the given records as-is.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Stores a record verbatim, bypassing defaults and validation.
    pub async fn insert_raw(&self, record: Record) {
        self.records.lock().await.push(record);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Makes every call fail (`false`) or succeed again (`true`).
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Delays every `list` response by `delay`.
    ///
    /// The records are read when the call starts, so a delayed response
    /// carries the collection as it was at request time.
    pub fn set_list_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.list_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Delays every `create` response by `delay`. The record is stored
    /// before the delay.
    pub fn set_create_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.create_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// How many times `list` was called.
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// How many times `create` was called.
    pub fn create_calls(&self) -> u64 {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self, operation: &str) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::persistence(format!(
                "{operation}: repository unavailable"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for InMemoryRepository {
    async fn list(&self) -> Result<Vec<Record>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available("list")?;
        let records = self.records.lock().await.clone();
        let delay = self.list_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(records)
    }

    async fn create(&self, record: NewRecord) -> Result<Record> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available("create")?;
        let stored = record.into_record(ReportId::generate(), Utc::now())?;
        self.records.lock().await.push(stored.clone());
        log::debug!("Stored record {:?}", stored.id);
        let delay = self.create_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(stored)
    }

    async fn delete_all(&self) -> Result<DeleteSummary> {
        self.check_available("delete_all")?;
        let mut records = self.records.lock().await;
        let deleted_count = records.len() as u64;
        records.clear();
        Ok(DeleteSummary { deleted_count })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
