//! Booking reconciliation and lifecycle engine (pure domain logic).
//!
//! This crate contains the business rules for reservations of every kind,
//! implemented as deterministic functions over in-memory values (no IO, no
//! HTTP, no storage). Callers pass `now` explicitly so every computation is
//! reproducible.
//!
//! - `adapter`: raw upstream records → canonical [`Booking`]
//! - `lifecycle`: status and payment state machines (single writer of those fields)
//! - `stats`: dashboard aggregates
//! - `filter`: composable criteria, search and stable sort
//! - `export`: CSV rendering

pub mod adapter;
pub mod booking;
pub mod export;
pub mod filter;
pub mod lifecycle;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{AdaptationError, BatchOutcome, RawRecord, normalize, normalize_batch, normalize_value};
pub use booking::{
    Amount, Booking, BookingKind, BookingStatus, FlightSubject, GuestBreakdown, LineItem,
    LodgingSubject, MerchandiseSubject, Party, PaymentStatus, Period, Provider, Subject,
    VenueSubject,
};
pub use export::{Column, default_columns, to_csv};
pub use filter::{
    DateRange, FilterCriteria, FilterQuery, Selector, SortDirection, SortField, SortSpec,
    ViewRequest, filter, sort,
};
pub use lifecycle::{LifecycleError, allowed_targets, can_transition, transition, transition_payment};
pub use stats::{BookingStats, StatsOptions, StatusCounts, aggregate, aggregate_by_kind, upcoming_within};
