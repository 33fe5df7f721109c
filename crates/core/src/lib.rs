//! `reservo-core`: shared building blocks for the booking engine.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, money, optimistic versions and the error taxonomy every other
//! crate converts into.

pub mod error;
pub mod id;
pub mod money;
pub mod version;

pub use error::{DomainError, DomainResult};
pub use id::{BookingId, PartyId, ProviderId, SubjectId};
pub use money::Money;
pub use version::ExpectedVersion;
