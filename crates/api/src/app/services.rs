use std::sync::Arc;

use reservo_core::DomainResult;
use reservo_infra::{
    BookingService, FetchOutcome, InMemoryBookingStore, InMemoryReminderSink, JsonFileSource,
    SnapshotLoader, SnapshotSlot,
};

use crate::config::ApiConfig;

pub type Bookings = BookingService<Arc<InMemoryBookingStore>, Arc<InMemoryReminderSink>>;

/// Everything handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub bookings: Bookings,
    pub reminders: Arc<InMemoryReminderSink>,
    pub snapshot: Arc<SnapshotSlot>,
}

impl AppServices {
    /// Empty in-memory wiring (dev/test).
    pub fn in_memory(upcoming_days: i64) -> Self {
        let reminders = Arc::new(InMemoryReminderSink::new());
        let bookings = BookingService::new(Arc::new(InMemoryBookingStore::new()), reminders.clone())
            .with_upcoming_days(upcoming_days);
        Self {
            bookings,
            reminders,
            snapshot: Arc::new(SnapshotSlot::new()),
        }
    }
}

/// Wire services from config, seeding the store from `seed_file` when set.
///
/// A seed file that cannot be read is a startup error; it is never replaced
/// by an empty or fabricated collection.
pub async fn build_services(config: &ApiConfig) -> DomainResult<AppServices> {
    let services = AppServices::in_memory(config.upcoming_days);

    if let Some(path) = &config.seed_file {
        let loader = SnapshotLoader::new(JsonFileSource::new(path), services.snapshot.clone());
        match loader.refresh().await {
            FetchOutcome::Loaded(rows) => {
                services.bookings.ingest(rows.iter().cloned())?;
            }
            FetchOutcome::Failed(err) => return Err(err),
        }
    }

    Ok(services)
}
