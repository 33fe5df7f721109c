//! Booking service: the single writer of the authoritative store.
//!
//! ```text
//! request
//!   ↓
//! 1. read current record (version N)
//!   ↓
//! 2. run the lifecycle validator (pure)
//!   ↓
//! 3. compare-and-swap against version N
//!   ↓ lost the race?
//! 4. re-read; already at target → success, else re-validate → IllegalTransition | Conflict
//! ```
//!
//! Reads (list, stats, export) are fresh passes over the store rows; nothing
//! derived is cached between requests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use reservo_bookings::{
    Booking, BookingKind, BookingStats, BookingStatus, FilterCriteria, LifecycleError,
    PaymentStatus, SortSpec, StatsOptions, ViewRequest, aggregate, aggregate_by_kind,
    default_columns, filter, lifecycle, sort, to_csv,
};
use reservo_core::{BookingId, DomainError, DomainResult, ExpectedVersion};

use crate::reminder::{Reminder, ReminderSink};
use crate::store::{BookingStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub inserted: usize,
    /// Duplicate id or confirmation code; already present in the store.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    #[serde(flatten)]
    pub overall: BookingStats,
    pub by_kind: BTreeMap<BookingKind, BookingStats>,
}

pub struct BookingService<S, R> {
    store: S,
    reminders: R,
    upcoming_days: i64,
}

impl<S, R> BookingService<S, R>
where
    S: BookingStore,
    R: ReminderSink,
{
    pub fn new(store: S, reminders: R) -> Self {
        Self {
            store,
            reminders,
            upcoming_days: reservo_bookings::stats::DEFAULT_UPCOMING_DAYS,
        }
    }

    pub fn with_upcoming_days(mut self, days: i64) -> Self {
        self.upcoming_days = days;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert adapted bookings. Records already present are skipped.
    pub fn ingest<I>(&self, bookings: I) -> DomainResult<IngestReport>
    where
        I: IntoIterator<Item = Booking>,
    {
        let mut report = IngestReport::default();
        for booking in bookings {
            match self.store.insert(booking) {
                Ok(_) => report.inserted += 1,
                Err(
                    err @ (StoreError::DuplicateId(_)
                    | StoreError::DuplicateCode { .. }
                    | StoreError::Invalid { .. }),
                ) => {
                    tracing::warn!(error = %err, "skipping booking");
                    report.skipped += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        tracing::info!(inserted = report.inserted, skipped = report.skipped, "bookings ingested");
        Ok(report)
    }

    pub fn get(&self, id: &BookingId) -> DomainResult<Booking> {
        Ok(self.store.get(id)?)
    }

    pub fn transition_status(
        &self,
        id: &BookingId,
        target: BookingStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        let booking = self.write(
            id,
            |b| b.status() == target,
            |b| reservo_bookings::transition(b, target, now),
        )?;
        tracing::info!(booking_id = %id, status = %booking.status(), version = booking.version(), "booking status changed");
        Ok(booking)
    }

    pub fn transition_payment(
        &self,
        id: &BookingId,
        target: PaymentStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        let booking = self.write(
            id,
            |b| b.payment_status() == target,
            |b| lifecycle::transition_payment(b, target, now),
        )?;
        tracing::info!(booking_id = %id, payment_status = %booking.payment_status(), version = booking.version(), "payment status changed");
        Ok(booking)
    }

    fn write(
        &self,
        id: &BookingId,
        at_target: impl Fn(&Booking) -> bool,
        step: impl Fn(&Booking) -> Result<Booking, LifecycleError>,
    ) -> DomainResult<Booking> {
        let current = self.store.get(id)?;
        if at_target(&current) {
            return Ok(current);
        }
        let next = step(&current)?;

        match self
            .store
            .compare_and_swap(ExpectedVersion::Exact(current.version()), next)
        {
            Ok(stored) => Ok(stored),
            Err(StoreError::Conflict { actual, .. }) => {
                tracing::warn!(booking_id = %id, read = current.version(), actual, "lost concurrent write");
                let fresh = self.store.get(id)?;
                if at_target(&fresh) {
                    return Ok(fresh);
                }
                // Still reachable from the fresh state: the caller decided on
                // stale data, so it has to re-read and retry.
                step(&fresh)?;
                Err(DomainError::conflict(format!(
                    "booking {id} changed concurrently (now at version {})",
                    fresh.version()
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Filtered, sorted, truncated view.
    pub fn list(&self, request: &ViewRequest, now: DateTime<Utc>) -> DomainResult<Vec<Booking>> {
        let rows = self.store.read(|rows| {
            request
                .apply(rows, now)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })?;
        Ok(rows)
    }

    pub fn stats(&self, criteria: &FilterCriteria, now: DateTime<Utc>) -> DomainResult<StatsReport> {
        let opts = StatsOptions {
            now,
            upcoming_days: self.upcoming_days,
        };
        let report = self.store.read(|rows| {
            let cohort = filter(rows, criteria, now);
            StatsReport {
                overall: aggregate(cohort.iter().copied(), &opts),
                by_kind: aggregate_by_kind(cohort.iter().copied(), &opts),
            }
        })?;
        Ok(report)
    }

    pub fn export_csv(
        &self,
        criteria: &FilterCriteria,
        spec: SortSpec,
        now: DateTime<Utc>,
    ) -> DomainResult<String> {
        self.store.read(|rows| {
            let mut view = filter(rows, criteria, now);
            sort(&mut view, spec);
            to_csv(view, &default_columns())
        })?
    }

    /// Queue a reminder for a booking that has not started yet.
    pub fn send_reminder(&self, id: &BookingId, now: DateTime<Utc>) -> DomainResult<Reminder> {
        let booking = self.store.get(id)?;

        if !matches!(booking.status(), BookingStatus::Pending | BookingStatus::Confirmed) {
            return Err(DomainError::validation(format!(
                "cannot remind a {} booking",
                booking.status()
            )));
        }
        if booking.occurs_at.start <= now {
            return Err(DomainError::validation(format!(
                "booking {id} has already started"
            )));
        }
        let recipient = booking
            .party
            .as_ref()
            .map(|p| p.email.trim())
            .filter(|email| !email.is_empty())
            .ok_or_else(|| DomainError::validation(format!("booking {id} has no contact email")))?;

        let reminder = Reminder {
            booking_id: booking.id.clone(),
            confirmation_code: booking.confirmation_code.clone(),
            recipient: recipient.to_string(),
            starts_at: booking.occurs_at.start,
            requested_at: now,
        };
        self.reminders.send(reminder.clone())?;
        Ok(reminder)
    }
}
