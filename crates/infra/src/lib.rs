//! Infrastructure layer: the authoritative booking store, the single-writer
//! service on top of it, snapshot fetching and outbound seams.

pub mod reminder;
pub mod service;
pub mod snapshot;
pub mod source;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use reminder::{InMemoryReminderSink, Reminder, ReminderSink};
pub use service::{BookingService, IngestReport, StatsReport};
pub use snapshot::{FetchOutcome, FetchTicket, SnapshotSlot};
pub use source::{BookingSource, InMemorySource, JsonFileSource, SnapshotLoader};
pub use store::{BookingStore, InMemoryBookingStore, StoreError};
