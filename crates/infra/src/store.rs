use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use reservo_bookings::{Booking, BookingKind};
use reservo_core::{BookingId, DomainError, ExpectedVersion};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("booking not found: {0}")]
    NotFound(BookingId),

    #[error("duplicate booking id: {0}")]
    DuplicateId(BookingId),

    #[error("duplicate {kind} confirmation code: {code}")]
    DuplicateCode { kind: BookingKind, code: String },

    /// Conditional update lost against a concurrent writer.
    #[error("stale write on {id} (expected: {expected:?}, actual: {actual})")]
    Conflict {
        id: BookingId,
        expected: ExpectedVersion,
        actual: u64,
    },

    /// The record breaks a canonical-booking invariant.
    #[error("invalid booking {id}: {reason}")]
    Invalid { id: BookingId, reason: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DomainError::not_found(format!("booking {id}")),
            StoreError::DuplicateId(_) | StoreError::DuplicateCode { .. } | StoreError::Invalid { .. } => {
                DomainError::validation(err.to_string())
            }
            StoreError::Conflict { .. } => DomainError::conflict(err.to_string()),
            StoreError::Unavailable(msg) => DomainError::transport(msg),
        }
    }
}

/// Authoritative booking records keyed by id.
///
/// Implementations serialize writers per record: `compare_and_swap` only
/// succeeds against the version the caller read.
pub trait BookingStore: Send + Sync {
    fn get(&self, id: &BookingId) -> Result<Booking, StoreError>;

    /// Run `f` over the records in place, in insertion order.
    fn read<R>(&self, f: impl FnOnce(&[Booking]) -> R) -> Result<R, StoreError>;

    /// Add a new record at version 0.
    fn insert(&self, booking: Booking) -> Result<Booking, StoreError>;

    /// Replace the record with the same id if its version still matches.
    /// Returns the stored copy with its version bumped.
    fn compare_and_swap(&self, expected: ExpectedVersion, booking: Booking) -> Result<Booking, StoreError>;
}

impl<S> BookingStore for Arc<S>
where
    S: BookingStore,
{
    fn get(&self, id: &BookingId) -> Result<Booking, StoreError> {
        (**self).get(id)
    }

    fn read<R>(&self, f: impl FnOnce(&[Booking]) -> R) -> Result<R, StoreError> {
        (**self).read(f)
    }

    fn insert(&self, booking: Booking) -> Result<Booking, StoreError> {
        (**self).insert(booking)
    }

    fn compare_and_swap(&self, expected: ExpectedVersion, booking: Booking) -> Result<Booking, StoreError> {
        (**self).compare_and_swap(expected, booking)
    }
}

#[derive(Debug, Default)]
struct Arena {
    rows: Vec<Booking>,
    by_id: HashMap<BookingId, usize>,
    codes: HashSet<(BookingKind, String)>,
}

/// In-memory store: an arena of bookings plus an id index.
///
/// Bookings are never removed, so arena positions are stable.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    inner: RwLock<Arena>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|a| a.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

fn validated(booking: &Booking) -> Result<(), StoreError> {
    booking.check_invariants().map_err(|e| StoreError::Invalid {
        id: booking.id.clone(),
        reason: e.to_string(),
    })
}

impl BookingStore for InMemoryBookingStore {
    fn get(&self, id: &BookingId) -> Result<Booking, StoreError> {
        let arena = self.inner.read().map_err(poisoned)?;
        arena
            .by_id
            .get(id)
            .map(|&idx| arena.rows[idx].clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn read<R>(&self, f: impl FnOnce(&[Booking]) -> R) -> Result<R, StoreError> {
        let arena = self.inner.read().map_err(poisoned)?;
        Ok(f(&arena.rows))
    }

    fn insert(&self, booking: Booking) -> Result<Booking, StoreError> {
        validated(&booking)?;
        let mut arena = self.inner.write().map_err(poisoned)?;

        if arena.by_id.contains_key(&booking.id) {
            return Err(StoreError::DuplicateId(booking.id));
        }
        let code = (booking.kind(), booking.confirmation_code.clone());
        if arena.codes.contains(&code) {
            return Err(StoreError::DuplicateCode {
                kind: code.0,
                code: code.1,
            });
        }

        let stored = booking.with_version(0);
        let idx = arena.rows.len();
        arena.by_id.insert(stored.id.clone(), idx);
        arena.codes.insert(code);
        arena.rows.push(stored.clone());
        Ok(stored)
    }

    fn compare_and_swap(&self, expected: ExpectedVersion, booking: Booking) -> Result<Booking, StoreError> {
        validated(&booking)?;
        let mut arena = self.inner.write().map_err(poisoned)?;

        let idx = *arena
            .by_id
            .get(&booking.id)
            .ok_or_else(|| StoreError::NotFound(booking.id.clone()))?;
        let current = &arena.rows[idx];

        if !expected.matches(current.version()) {
            return Err(StoreError::Conflict {
                id: booking.id,
                expected,
                actual: current.version(),
            });
        }
        // Identity fields are immutable once issued.
        if current.confirmation_code != booking.confirmation_code || current.kind() != booking.kind() {
            return Err(StoreError::Unavailable(format!(
                "refusing to rewrite identity of booking {}",
                booking.id
            )));
        }

        let stored = booking.with_version(current.version() + 1);
        arena.rows[idx] = stored.clone();
        Ok(stored)
    }
}
