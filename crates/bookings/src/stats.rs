//! Dashboard aggregates over a cohort of canonical bookings.
//!
//! All ratios are percentages in `[0, 100]` and are `0` when their
//! denominator is `0`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use reservo_core::{Money, SubjectId};

use crate::booking::{Booking, BookingKind, BookingStatus};

pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy)]
pub struct StatsOptions {
    pub now: DateTime<Utc>,
    pub upcoming_days: i64,
}

impl StatsOptions {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub confirmed: u64,
    pub processing: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl StatusCounts {
    fn bump(&mut self, status: BookingStatus) {
        let slot = match status {
            BookingStatus::Pending => &mut self.pending,
            BookingStatus::Confirmed => &mut self.confirmed,
            BookingStatus::Processing => &mut self.processing,
            BookingStatus::Shipped => &mut self.shipped,
            BookingStatus::Delivered => &mut self.delivered,
            BookingStatus::Completed => &mut self.completed,
            BookingStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total: u64,
    pub counts: StatusCounts,
    pub settled: u64,
    /// Sum of `amount.total` over settled bookings only.
    pub revenue: Money,
    pub service_fees: Money,
    pub average_booking_value: Money,
    pub party_size_total: u64,
    pub capacity_total: u64,
    pub occupancy_rate: f64,
    pub conversion_rate: f64,
    pub upcoming: u64,
}

/// `numerator / denominator` as a percentage clamped to `[0, 100]`.
fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64 * 100.0).clamp(0.0, 100.0)
}

fn is_upcoming(booking: &Booking, now: DateTime<Utc>, days: i64) -> bool {
    // A window past the representable range has no upper bound.
    let horizon = Duration::try_days(days.max(0)).and_then(|d| now.checked_add_signed(d));
    let start = booking.occurs_at.start;
    booking.status() == BookingStatus::Confirmed
        && start >= now
        && horizon.is_none_or(|h| start <= h)
}

/// Confirmed bookings starting in `[now, now + days]`.
pub fn upcoming_within<'a, I>(bookings: I, now: DateTime<Utc>, days: i64) -> u64
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings
        .into_iter()
        .filter(|b| is_upcoming(b, now, days))
        .count() as u64
}

/// Compute every statistic in a single pass.
///
/// Capacity is counted once per distinct subject so a listing booked many
/// times does not inflate the denominator.
pub fn aggregate<'a, I>(bookings: I, opts: &StatsOptions) -> BookingStats
where
    I: IntoIterator<Item = &'a Booking>,
{
    let mut total = 0u64;
    let mut counts = StatusCounts::default();
    let mut settled = 0u64;
    let mut revenue = Money::ZERO;
    let mut service_fees = Money::ZERO;
    let mut party_size_total = 0u64;
    let mut capacities: HashMap<&SubjectId, u32> = HashMap::new();
    let mut upcoming = 0u64;

    for b in bookings {
        total += 1;
        counts.bump(b.status());

        if let (Some(id), Some(cap)) = (b.subject.subject_id(), b.subject.capacity()) {
            capacities.entry(id).or_insert(cap);
        }
        if b.is_settled() {
            settled += 1;
            revenue = revenue + b.amount.total;
            service_fees = service_fees + b.amount.service_fee;
            party_size_total += u64::from(b.party_size);
        }
        if is_upcoming(b, opts.now, opts.upcoming_days) {
            upcoming += 1;
        }
    }

    let capacity_total: u64 = capacities.values().map(|c| u64::from(*c)).sum();
    let average_booking_value = if settled == 0 {
        Money::ZERO
    } else {
        // Rounded half up to the nearest minor unit.
        Money::from_minor((revenue.minor() + settled / 2) / settled)
    };

    BookingStats {
        total,
        counts,
        settled,
        revenue,
        service_fees,
        average_booking_value,
        party_size_total,
        capacity_total,
        occupancy_rate: percentage(party_size_total, capacity_total),
        conversion_rate: percentage(settled, total),
        upcoming,
    }
}

/// Same statistics, one entry per kind present in the input.
pub fn aggregate_by_kind<'a, I>(bookings: I, opts: &StatsOptions) -> BTreeMap<BookingKind, BookingStats>
where
    I: IntoIterator<Item = &'a Booking>,
{
    let mut groups: BTreeMap<BookingKind, Vec<&Booking>> = BTreeMap::new();
    for b in bookings {
        groups.entry(b.kind()).or_default().push(b);
    }
    groups
        .into_iter()
        .map(|(kind, group)| (kind, aggregate(group, opts)))
        .collect()
}
