//! Outbound reminder seam. Delivery (email, SMS, push) lives behind the sink.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use reservo_core::{BookingId, DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub booking_id: BookingId,
    pub confirmation_code: String,
    pub recipient: String,
    pub starts_at: DateTime<Utc>,
    pub requested_at: DateTime<Utc>,
}

pub trait ReminderSink: Send + Sync {
    /// Hand the reminder to the delivery channel. Failures are transport errors.
    fn send(&self, reminder: Reminder) -> DomainResult<()>;
}

impl<S> ReminderSink for Arc<S>
where
    S: ReminderSink + ?Sized,
{
    fn send(&self, reminder: Reminder) -> DomainResult<()> {
        (**self).send(reminder)
    }
}

/// Records reminders instead of delivering them.
#[derive(Debug, Default)]
pub struct InMemoryReminderSink {
    sent: Mutex<Vec<Reminder>>,
}

impl InMemoryReminderSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Reminder> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ReminderSink for InMemoryReminderSink {
    fn send(&self, reminder: Reminder) -> DomainResult<()> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| DomainError::transport("reminder outbox lock poisoned"))?;
        tracing::info!(booking_id = %reminder.booking_id, "reminder queued");
        sent.push(reminder);
        Ok(())
    }
}
