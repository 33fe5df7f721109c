//! Status and payment state machines.
//!
//! This module is the only writer of `status`, `payment_status`,
//! `updated_at` and `cancelled_at`. Legal edges live in one table per
//! machine; nothing else in the engine compares status literals to decide
//! what may happen next.

use chrono::{DateTime, Utc};
use thiserror::Error;

use reservo_core::DomainError;

use crate::booking::{Booking, BookingKind, BookingStatus, PaymentStatus};

use BookingStatus::*;

/// Stays, visits and flights.
const RESERVATION_STATES: &[BookingStatus] = &[Pending, Confirmed, Cancelled, Completed];

const RESERVATION_EDGES: &[(BookingStatus, BookingStatus)] = &[
    (Pending, Confirmed),
    (Pending, Cancelled),
    (Confirmed, Cancelled),
    (Confirmed, Completed),
];

/// Merchandise orders: linear fulfilment, cancellable until delivered.
const ORDER_STATES: &[BookingStatus] = &[Pending, Confirmed, Processing, Shipped, Delivered, Cancelled];

const ORDER_EDGES: &[(BookingStatus, BookingStatus)] = &[
    (Pending, Confirmed),
    (Confirmed, Processing),
    (Processing, Shipped),
    (Shipped, Delivered),
    (Pending, Cancelled),
    (Confirmed, Cancelled),
    (Processing, Cancelled),
    (Shipped, Cancelled),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("illegal {kind} transition from {from} to {to}")]
    IllegalTransition {
        kind: BookingKind,
        from: BookingStatus,
        to: BookingStatus,
    },

    /// `paid` requested on a cancelled booking; it has to be refunded instead.
    #[error("cannot mark a {status} booking as {to}")]
    PaymentBlocked {
        kind: BookingKind,
        status: BookingStatus,
        to: PaymentStatus,
    },
}

impl From<LifecycleError> for DomainError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::IllegalTransition { kind, from, to } => {
                DomainError::illegal_transition(kind.as_str(), from.as_str(), to.as_str())
            }
            LifecycleError::PaymentBlocked { kind, status, to } => DomainError::illegal_transition(
                format!("{kind} payment"),
                status.as_str(),
                to.as_str(),
            ),
        }
    }
}

fn edges(kind: BookingKind) -> &'static [(BookingStatus, BookingStatus)] {
    match kind {
        BookingKind::MerchandiseOrder => ORDER_EDGES,
        BookingKind::Lodging | BookingKind::VenueTicket | BookingKind::Flight => RESERVATION_EDGES,
    }
}

/// States a kind may ever occupy.
pub fn vocabulary(kind: BookingKind) -> &'static [BookingStatus] {
    match kind {
        BookingKind::MerchandiseOrder => ORDER_STATES,
        BookingKind::Lodging | BookingKind::VenueTicket | BookingKind::Flight => RESERVATION_STATES,
    }
}

pub fn is_in_vocabulary(kind: BookingKind, status: BookingStatus) -> bool {
    vocabulary(kind).contains(&status)
}

/// One-hop legality. Staying put is not an edge; see [`transition`] for idempotence.
pub fn can_transition(kind: BookingKind, from: BookingStatus, to: BookingStatus) -> bool {
    edges(kind).contains(&(from, to))
}

/// Targets reachable in one hop, in table order (for action menus).
pub fn allowed_targets(kind: BookingKind, from: BookingStatus) -> Vec<BookingStatus> {
    edges(kind)
        .iter()
        .filter(|(f, _)| *f == from)
        .map(|(_, t)| *t)
        .collect()
}

/// Move a booking to `target`.
///
/// Returns the updated copy; the input is never modified. Re-applying the
/// current status is a successful no-op (retries are safe) and leaves
/// `updated_at` untouched.
pub fn transition(
    booking: &Booking,
    target: BookingStatus,
    now: DateTime<Utc>,
) -> Result<Booking, LifecycleError> {
    let kind = booking.kind();
    if booking.status == target {
        return Ok(booking.clone());
    }
    if !can_transition(kind, booking.status, target) {
        return Err(LifecycleError::IllegalTransition {
            kind,
            from: booking.status,
            to: target,
        });
    }

    let mut next = booking.clone();
    next.status = target;
    next.updated_at = now;
    if target == Cancelled {
        next.cancelled_at = Some(now);
    }
    Ok(next)
}

/// Move the payment status to `target`.
///
/// Every payment state is reachable from every other, except that a
/// cancelled booking can never become `paid`.
pub fn transition_payment(
    booking: &Booking,
    target: PaymentStatus,
    now: DateTime<Utc>,
) -> Result<Booking, LifecycleError> {
    if booking.payment_status == target {
        return Ok(booking.clone());
    }
    if target == PaymentStatus::Paid && booking.status == Cancelled {
        return Err(LifecycleError::PaymentBlocked {
            kind: booking.kind(),
            status: booking.status,
            to: target,
        });
    }

    let mut next = booking.clone();
    next.payment_status = target;
    next.updated_at = now;
    Ok(next)
}
