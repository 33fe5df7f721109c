//! Composable filter criteria, free-text search and stable sorting.
//!
//! Criteria are ANDed and evaluated in one pass. The pipeline hands back
//! references into the caller's collection; it never clones bookings.

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use reservo_core::{DomainError, DomainResult, ProviderId};

use crate::booking::{Booking, BookingKind, BookingStatus, PaymentStatus, Subject};

/// Either no constraint (`all`) or an exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(expected) => expected == value,
        }
    }
}

impl<T> Selector<T>
where
    T: FromStr<Err = DomainError>,
{
    /// `None`, blank and `all` mean no constraint.
    pub fn parse(raw: Option<&str>, param: &str) -> DomainResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Selector::All),
            Some(v) if v.eq_ignore_ascii_case("all") => Ok(Selector::All),
            Some(v) => v
                .parse()
                .map(Selector::Only)
                .map_err(|_| DomainError::validation(format!("invalid {param}: {v}"))),
        }
    }
}

/// Calendar bucket evaluated against `occurs_at.start`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Today,
    Last7Days,
    Last30Days,
    Future,
}

impl DateRange {
    pub fn contains(self, start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            DateRange::All => true,
            DateRange::Today => start.date_naive() == now.date_naive(),
            DateRange::Last7Days => start >= now - Duration::days(7) && start <= now,
            DateRange::Last30Days => start >= now - Duration::days(30) && start <= now,
            DateRange::Future => start > now,
        }
    }
}

impl FromStr for DateRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(DateRange::All),
            "today" => Ok(DateRange::Today),
            "last7days" => Ok(DateRange::Last7Days),
            "last30days" => Ok(DateRange::Last30Days),
            "future" | "upcoming" => Ok(DateRange::Future),
            other => Err(DomainError::validation(format!("invalid dateRange: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Lower-cased needle; `None` matches everything.
    search: Option<String>,
    pub status: Selector<BookingStatus>,
    pub payment_status: Selector<PaymentStatus>,
    pub date_range: DateRange,
    pub kind: Selector<BookingKind>,
    pub provider: Selector<ProviderId>,
}

impl FilterCriteria {
    pub fn with_search(mut self, needle: &str) -> Self {
        let needle = needle.trim();
        self.search = (!needle.is_empty()).then(|| needle.to_lowercase());
        self
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn matches(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        self.status.matches(&booking.status())
            && self.payment_status.matches(&booking.payment_status())
            && self.kind.matches(&booking.kind())
            && self.date_range.contains(booking.occurs_at.start, now)
            && self.provider_matches(booking)
            && self.search_matches(booking)
    }

    fn provider_matches(&self, booking: &Booking) -> bool {
        match &self.provider {
            Selector::All => true,
            Selector::Only(id) => booking.provider.as_ref().is_some_and(|p| &p.id == id),
        }
    }

    fn search_matches(&self, booking: &Booking) -> bool {
        let Some(needle) = self.search.as_deref() else {
            return true;
        };
        let hit = |field: &str| field.to_lowercase().contains(needle);

        if hit(&booking.confirmation_code)
            || hit(&booking.subject.display_name())
            || hit(&booking.subject.location())
        {
            return true;
        }
        if let Some(party) = &booking.party {
            if hit(&party.display_name) || hit(&party.email) {
                return true;
            }
        }
        match &booking.subject {
            Subject::Flight(f) => hit(&f.carrier) || hit(&f.flight_number),
            _ => false,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    OccursAt,
    Total,
    ConfirmationCode,
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "createdAt" => Ok(SortField::CreatedAt),
            "occursAt" | "date" => Ok(SortField::OccursAt),
            "amount" | "total" => Ok(SortField::Total),
            "confirmationCode" => Ok(SortField::ConfirmationCode),
            other => Err(DomainError::validation(format!("invalid sort: {other}"))),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DomainError::validation(format!("invalid dir: {other}"))),
        }
    }
}

/// Defaults to newest first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    fn compare(&self, a: &Booking, b: &Booking) -> Ordering {
        let ord = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::OccursAt => a.occurs_at.start.cmp(&b.occurs_at.start),
            SortField::Total => a.amount.total.cmp(&b.amount.total),
            SortField::ConfirmationCode => a.confirmation_code.cmp(&b.confirmation_code),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Keep the bookings matching every criterion, in input order.
pub fn filter<'a, I>(bookings: I, criteria: &FilterCriteria, now: DateTime<Utc>) -> Vec<&'a Booking>
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings
        .into_iter()
        .filter(|b| criteria.matches(b, now))
        .collect()
}

/// Stable sort: equal keys keep their relative input order in both directions.
pub fn sort(view: &mut [&Booking], spec: SortSpec) {
    view.sort_by(|a, b| spec.compare(a, b));
}

/// Query-string shape shared by list, stats and export endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub kind: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub date_range: Option<String>,
    pub search: Option<String>,
    pub provider: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub limit: Option<String>,
}

/// A fully parsed view request: what to keep, how to order it, how many.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRequest {
    pub criteria: FilterCriteria,
    pub sort: SortSpec,
    pub limit: Option<usize>,
}

impl TryFrom<&FilterQuery> for ViewRequest {
    type Error = DomainError;

    fn try_from(q: &FilterQuery) -> Result<Self, Self::Error> {
        let criteria = FilterCriteria {
            search: None,
            status: Selector::parse(q.status.as_deref(), "status")?,
            payment_status: Selector::parse(q.payment_status.as_deref(), "paymentStatus")?,
            date_range: q.date_range.as_deref().unwrap_or("all").parse()?,
            kind: Selector::parse(q.kind.as_deref(), "kind")?,
            provider: Selector::parse(q.provider.as_deref(), "provider")?,
        }
        .with_search(q.search.as_deref().unwrap_or(""));

        let sort = SortSpec {
            field: match q.sort.as_deref() {
                None | Some("") => SortField::default(),
                Some(s) => s.parse()?,
            },
            direction: match q.dir.as_deref() {
                None | Some("") => SortDirection::default(),
                Some(d) => d.parse()?,
            },
        };

        let limit = match q.limit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(l) => Some(
                l.parse::<usize>()
                    .map_err(|_| DomainError::validation(format!("invalid limit: {l}")))?,
            ),
        };

        Ok(ViewRequest {
            criteria,
            sort,
            limit,
        })
    }
}

impl ViewRequest {
    /// Filter, sort, then truncate.
    pub fn apply<'a, I>(&self, bookings: I, now: DateTime<Utc>) -> Vec<&'a Booking>
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        let mut view = filter(bookings, &self.criteria, now);
        sort(&mut view, self.sort);
        if let Some(limit) = self.limit {
            view.truncate(limit);
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use proptest::prelude::*;

    fn ids(view: &[&Booking]) -> Vec<String> {
        view.iter().map(|b| b.id.to_string()).collect()
    }

    fn sample() -> Vec<Booking> {
        vec![
            testing::lodging("a", BookingStatus::Confirmed, 600_00),
            testing::venue("b", BookingStatus::Pending, 80_00),
            testing::flight("c", BookingStatus::Cancelled, 400_00),
            testing::merchandise("d", BookingStatus::Shipped),
        ]
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let all = sample();
        let now = testing::now();
        let by = |needle: &str| ids(&filter(&all, &FilterCriteria::default().with_search(needle), now));

        assert_eq!(by("conf-a"), vec!["a"]);
        assert_eq!(by("MUSEUM"), vec!["b"]);
        assert_eq!(by("tp1024"), vec!["c"]);
        assert_eq!(by("d@EXAMPLE.com"), vec!["d"]);
        assert_eq!(by("porto"), vec!["a"]);
        assert_eq!(by("   ").len(), 4);
        assert!(by("nothing-matches").is_empty());
    }

    #[test]
    fn selectors_and_date_buckets_combine() {
        let all = sample();
        let now = testing::now();

        let future_confirmed = FilterCriteria {
            status: Selector::Only(BookingStatus::Confirmed),
            date_range: DateRange::Future,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter(&all, &future_confirmed, now)), vec!["a"]);

        let recent = FilterCriteria {
            date_range: DateRange::Last7Days,
            ..FilterCriteria::default()
        };
        // Only the order's placement window lies in the past.
        assert_eq!(ids(&filter(&all, &recent, now)), vec!["d"]);

        let flights = FilterCriteria {
            kind: Selector::Only(BookingKind::Flight),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter(&all, &flights, now)), vec!["c"]);
    }

    #[test]
    fn today_means_same_calendar_date() {
        let now = testing::now();
        let b = testing::starting_at(
            testing::venue("b", BookingStatus::Pending, 1),
            now.date_naive().and_hms_opt(23, 59, 0).unwrap().and_utc(),
        );
        assert!(DateRange::Today.contains(b.occurs_at.start, now));
        assert!(!DateRange::Today.contains(now + Duration::days(1), now));
    }

    #[test]
    fn provider_selector_skips_bookings_without_provider() {
        let mut all = sample();
        all[1].provider = None;
        let c = FilterCriteria {
            provider: Selector::Only(ProviderId::new("prov-1")),
            ..FilterCriteria::default()
        };
        assert_eq!(filter(&all, &c, testing::now()).len(), 3);
    }

    #[test]
    fn query_parsing_rejects_unknown_values() {
        let q = FilterQuery {
            status: Some("archived".into()),
            ..FilterQuery::default()
        };
        let err = ViewRequest::try_from(&q).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("status")));

        let q = FilterQuery {
            date_range: Some("yesterday".into()),
            ..FilterQuery::default()
        };
        assert!(ViewRequest::try_from(&q).is_err());

        let q = FilterQuery {
            limit: Some("-1".into()),
            ..FilterQuery::default()
        };
        assert!(ViewRequest::try_from(&q).is_err());
    }

    #[test]
    fn query_parsing_accepts_all_and_defaults() {
        let q = FilterQuery {
            kind: Some("all".into()),
            status: Some("confirmed".into()),
            payment_status: Some("ALL".into()),
            sort: Some("amount".into()),
            dir: Some("asc".into()),
            limit: Some("2".into()),
            search: Some(" Porto ".into()),
            ..FilterQuery::default()
        };
        let req = ViewRequest::try_from(&q).unwrap();
        assert_eq!(req.criteria.kind, Selector::All);
        assert_eq!(req.criteria.status, Selector::Only(BookingStatus::Confirmed));
        assert_eq!(req.criteria.search(), Some("porto"));
        assert_eq!(req.sort.field, SortField::Total);
        assert_eq!(req.limit, Some(2));

        let defaults = ViewRequest::try_from(&FilterQuery::default()).unwrap();
        assert_eq!(defaults, ViewRequest::default());
    }

    #[test]
    fn view_request_sorts_then_truncates() {
        let all = sample();
        let req = ViewRequest {
            sort: SortSpec {
                field: SortField::Total,
                direction: SortDirection::Desc,
            },
            limit: Some(2),
            ..ViewRequest::default()
        };
        assert_eq!(ids(&req.apply(&all, testing::now())), vec!["a", "c"]);
    }

    fn any_booking() -> impl Strategy<Value = Booking> {
        let status = prop::sample::select(vec![
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
        ]);
        (0u32..1000, status, 0u64..5, -10i64..10).prop_map(|(n, status, total, day)| {
            let b = testing::venue(&format!("b{n}"), status, total);
            testing::starting_at(b, testing::now() + Duration::days(day))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: applying two criteria in either order yields the same set.
        #[test]
        fn filters_commute(bookings in prop::collection::vec(any_booking(), 0..40)) {
            let now = testing::now();
            let status = FilterCriteria {
                status: Selector::Only(BookingStatus::Confirmed),
                ..FilterCriteria::default()
            };
            let future = FilterCriteria {
                date_range: DateRange::Future,
                ..FilterCriteria::default()
            };

            let one = filter(filter(&bookings, &status, now), &future, now);
            let two = filter(filter(&bookings, &future, now), &status, now);
            let combined = filter(&bookings, &FilterCriteria { date_range: DateRange::Future, ..status.clone() }, now);
            prop_assert_eq!(&one, &two);
            prop_assert_eq!(&one, &combined);
        }

        /// Property: bookings with equal keys keep their input order.
        #[test]
        fn sort_is_stable(
            bookings in prop::collection::vec(any_booking(), 0..40),
            desc in any::<bool>(),
        ) {
            let spec = SortSpec {
                field: SortField::Total,
                direction: if desc { SortDirection::Desc } else { SortDirection::Asc },
            };
            let mut view: Vec<&Booking> = bookings.iter().collect();
            sort(&mut view, spec);

            let position = |b: &Booking| {
                bookings.iter().position(|x| core::ptr::eq(x, b)).unwrap()
            };
            for pair in view.windows(2) {
                prop_assert_ne!(spec.compare(pair[0], pair[1]), Ordering::Greater);
                if pair[0].amount.total == pair[1].amount.total {
                    prop_assert!(position(pair[0]) < position(pair[1]));
                }
            }
        }
    }
}
