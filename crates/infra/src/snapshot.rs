//! Last-fetch-wins snapshot slot.
//!
//! Every fetch takes a ticket before it starts. When it completes, its
//! outcome is installed only if no fetch issued later has already landed, so
//! a slow, older fetch can never overwrite a newer snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use reservo_bookings::Booking;
use reservo_core::DomainError;

/// Issue-order token for one fetch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// What a fetch produced.
///
/// An empty `Loaded` means the upstream genuinely has no bookings; a failed
/// fetch is `Failed` and never shows up as placeholder rows.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(Arc<Vec<Booking>>),
    Failed(DomainError),
}

impl FetchOutcome {
    pub fn bookings(&self) -> Option<&[Booking]> {
        match self {
            FetchOutcome::Loaded(rows) => Some(rows.as_slice()),
            FetchOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

#[derive(Debug, Default)]
pub struct SnapshotSlot {
    issued: AtomicU64,
    installed: RwLock<Option<(FetchTicket, FetchOutcome)>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets are strictly increasing, starting at 1.
    pub fn issue(&self) -> FetchTicket {
        FetchTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install `outcome` unless a newer ticket already landed. Returns
    /// whether it was installed.
    pub fn install(&self, ticket: FetchTicket, outcome: FetchOutcome) -> bool {
        let Ok(mut slot) = self.installed.write() else {
            return false;
        };
        match slot.as_ref() {
            Some((current, _)) if *current > ticket => {
                tracing::debug!(
                    stale = ticket.sequence(),
                    current = current.sequence(),
                    "discarding stale snapshot"
                );
                false
            }
            _ => {
                *slot = Some((ticket, outcome));
                true
            }
        }
    }

    /// The newest installed outcome, `None` before the first fetch lands.
    pub fn current(&self) -> Option<FetchOutcome> {
        self.installed
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|(_, outcome)| outcome.clone()))
    }
}
