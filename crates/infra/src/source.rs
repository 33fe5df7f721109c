//! Upstream booking sources and the loader that adapts their output into
//! snapshots.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use reservo_bookings::{RawRecord, normalize_batch};
use reservo_core::{DomainError, DomainResult};

use crate::snapshot::{FetchOutcome, SnapshotSlot};

/// Where raw booking records come from (HTTP upstream, file, fixture).
///
/// One call is one request/response round trip; there are no partial results.
#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn fetch(&self) -> DomainResult<Vec<RawRecord>>;
}

#[async_trait]
impl<S> BookingSource for Arc<S>
where
    S: BookingSource + ?Sized,
{
    async fn fetch(&self) -> DomainResult<Vec<RawRecord>> {
        (**self).fetch().await
    }
}

/// Fixed records, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<RawRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl BookingSource for InMemorySource {
    async fn fetch(&self) -> DomainResult<Vec<RawRecord>> {
        Ok(self.records.clone())
    }
}

/// A JSON array of kind-tagged raw records on disk.
///
/// Elements that are not objects of a known kind are skipped with a warning;
/// a missing or unparseable file is a transport error.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BookingSource for JsonFileSource {
    async fn fetch(&self) -> DomainResult<Vec<RawRecord>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            DomainError::transport(format!("reading {}: {e}", self.path.display()))
        })?;
        let values: Vec<serde_json::Value> = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::transport(format!("parsing {}: {e}", self.path.display()))
        })?;

        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<RawRecord>(value) {
                Ok(raw) => records.push(raw),
                Err(e) => tracing::warn!(index, error = %e, "skipping undecodable booking record"),
            }
        }
        Ok(records)
    }
}

/// Fetch → adapt → install into a [`SnapshotSlot`].
pub struct SnapshotLoader<S> {
    source: S,
    slot: Arc<SnapshotSlot>,
}

impl<S> SnapshotLoader<S>
where
    S: BookingSource,
{
    pub fn new(source: S, slot: Arc<SnapshotSlot>) -> Self {
        Self { source, slot }
    }

    pub fn slot(&self) -> &Arc<SnapshotSlot> {
        &self.slot
    }

    /// Run one fetch and return its own outcome, whether or not a newer
    /// fetch has already superseded it in the slot.
    pub async fn refresh(&self) -> FetchOutcome {
        let ticket = self.slot.issue();
        let outcome = match self.source.fetch().await {
            Ok(raws) => {
                let batch = normalize_batch(raws);
                tracing::info!(
                    ticket = ticket.sequence(),
                    accepted = batch.bookings.len(),
                    rejected = batch.rejected.len(),
                    "booking snapshot fetched"
                );
                FetchOutcome::Loaded(Arc::new(batch.bookings))
            }
            Err(err) => {
                tracing::warn!(ticket = ticket.sequence(), error = %err, "booking snapshot fetch failed");
                FetchOutcome::Failed(err)
            }
        };
        self.slot.install(ticket, outcome.clone());
        outcome
    }
}
