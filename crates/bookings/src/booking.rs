use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reservo_core::{BookingId, DomainError, DomainResult, Money, PartyId, ProviderId, SubjectId};

/// Reservation kind. Derived from the [`Subject`] variant, never stored apart from it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingKind {
    Lodging,
    VenueTicket,
    Flight,
    MerchandiseOrder,
}

impl BookingKind {
    pub const ALL: [BookingKind; 4] = [
        BookingKind::Lodging,
        BookingKind::VenueTicket,
        BookingKind::Flight,
        BookingKind::MerchandiseOrder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingKind::Lodging => "lodging",
            BookingKind::VenueTicket => "venueTicket",
            BookingKind::Flight => "flight",
            BookingKind::MerchandiseOrder => "merchandiseOrder",
        }
    }
}

impl core::fmt::Display for BookingKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown booking kind: {s}")))
    }
}

/// Union of the booking and order status vocabularies.
///
/// Which values a kind may actually reach is decided by `lifecycle`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 7] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Processing,
        BookingStatus::Shipped,
        BookingStatus::Delivered,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Processing => "processing",
            BookingStatus::Shipped => "shipped",
            BookingStatus::Delivered => "delivered",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Settled bookings count toward revenue.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::Completed | BookingStatus::Delivered
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::Completed | BookingStatus::Delivered
        )
    }
}

impl core::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // "canceled" shows up in older order payloads.
        if s.eq_ignore_ascii_case("canceled") {
            return Ok(BookingStatus::Cancelled);
        }
        BookingStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown status: {s}")))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl core::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown payment status: {s}")))
    }
}

/// When the booked thing happens: stay, visit, flight, or order window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

/// Amounts are in minor units of `currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    pub total: Money,
    pub service_fee: Money,
    pub currency: String,
}

/// End customer. Absent on guest/anonymous bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: PartyId,
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: ProviderId,
    pub display_name: String,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestBreakdown {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl GuestBreakdown {
    pub fn total(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LodgingSubject {
    pub listing_id: SubjectId,
    pub title: String,
    pub location: String,
    pub nightly_price: Money,
    pub capacity: Option<u32>,
    pub thumbnail: String,
    pub views: u64,
    pub guests: GuestBreakdown,
    pub nights: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSubject {
    pub place_id: SubjectId,
    pub title: String,
    pub location: String,
    pub ticket_price: Money,
    pub capacity: Option<u32>,
    pub thumbnail: String,
    pub views: u64,
    pub tickets: u32,
    pub visit_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSubject {
    pub flight_id: SubjectId,
    pub carrier: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub seat_price: Money,
    pub capacity: Option<u32>,
    pub cabin_class: Option<String>,
    pub passengers: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: SubjectId,
    pub title: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl LineItem {
    pub fn subtotal(&self) -> Money {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchandiseSubject {
    pub items: Vec<LineItem>,
    pub shipping_city: Option<String>,
}

/// The bookable entity, one payload per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Subject {
    Lodging(LodgingSubject),
    VenueTicket(VenueSubject),
    Flight(FlightSubject),
    MerchandiseOrder(MerchandiseSubject),
}

impl Subject {
    pub fn kind(&self) -> BookingKind {
        match self {
            Subject::Lodging(_) => BookingKind::Lodging,
            Subject::VenueTicket(_) => BookingKind::VenueTicket,
            Subject::Flight(_) => BookingKind::Flight,
            Subject::MerchandiseOrder(_) => BookingKind::MerchandiseOrder,
        }
    }

    /// Identity used to count capacity once per subject. Orders have none.
    pub fn subject_id(&self) -> Option<&SubjectId> {
        match self {
            Subject::Lodging(s) => Some(&s.listing_id),
            Subject::VenueTicket(s) => Some(&s.place_id),
            Subject::Flight(s) => Some(&s.flight_id),
            Subject::MerchandiseOrder(_) => None,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Subject::Lodging(s) => s.title.clone(),
            Subject::VenueTicket(s) => s.title.clone(),
            Subject::Flight(s) => format!("{} → {}", s.origin, s.destination),
            Subject::MerchandiseOrder(s) => s
                .items
                .iter()
                .map(|i| i.title.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    pub fn location(&self) -> String {
        match self {
            Subject::Lodging(s) => s.location.clone(),
            Subject::VenueTicket(s) => s.location.clone(),
            Subject::Flight(s) => format!("{}-{}", s.origin, s.destination),
            Subject::MerchandiseOrder(s) => s.shipping_city.clone().unwrap_or_default(),
        }
    }

    pub fn capacity(&self) -> Option<u32> {
        match self {
            Subject::Lodging(s) => s.capacity,
            Subject::VenueTicket(s) => s.capacity,
            Subject::Flight(s) => s.capacity,
            Subject::MerchandiseOrder(_) => None,
        }
    }

    /// Unit price of the subject where one exists.
    pub fn price(&self) -> Option<Money> {
        match self {
            Subject::Lodging(s) => Some(s.nightly_price),
            Subject::VenueTicket(s) => Some(s.ticket_price),
            Subject::Flight(s) => Some(s.seat_price),
            Subject::MerchandiseOrder(_) => None,
        }
    }

    /// Kind-specific length of the booking: nights, tickets, flight time, items.
    pub fn duration_label(&self, period: &Period) -> String {
        match self {
            Subject::Lodging(s) => plural(s.nights, "night", "nights"),
            Subject::VenueTicket(s) => plural(s.tickets, "ticket", "tickets"),
            Subject::Flight(_) => match period.end {
                Some(end) if end > period.start => {
                    let minutes = (end - period.start).num_minutes();
                    format!("{}h {:02}m", minutes / 60, minutes % 60)
                }
                _ => String::new(),
            },
            Subject::MerchandiseOrder(s) => {
                let units: u32 = s.items.iter().map(|i| i.quantity).sum();
                plural(units, "item", "items")
            }
        }
    }

    pub fn party_breakdown(&self, party_size: u32) -> String {
        match self {
            Subject::Lodging(s) => format!(
                "{}, {}, {}",
                plural(s.guests.adults, "adult", "adults"),
                plural(s.guests.children, "child", "children"),
                plural(s.guests.infants, "infant", "infants"),
            ),
            Subject::VenueTicket(_) => plural(party_size, "visitor", "visitors"),
            Subject::Flight(_) => plural(party_size, "passenger", "passengers"),
            Subject::MerchandiseOrder(_) => plural(party_size, "customer", "customers"),
        }
    }
}

fn plural(n: u32, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Canonical booking.
///
/// Built only by `adapter`; `status`, `payment_status`, `updated_at` and
/// `cancelled_at` are written only by `lifecycle`, and `version` only by the
/// authoritative store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub confirmation_code: String,
    pub(crate) status: BookingStatus,
    pub(crate) payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) cancelled_at: Option<DateTime<Utc>>,
    pub occurs_at: Period,
    pub party_size: u32,
    pub amount: Amount,
    pub party: Option<Party>,
    pub provider: Option<Provider>,
    pub payment_method: Option<String>,
    pub subject: Subject,
    pub special_requests: Option<String>,
    pub(crate) version: u64,
}

impl Booking {
    pub fn kind(&self) -> BookingKind {
        self.subject.kind()
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }

    /// Copy stamped with the version the store assigned on write.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Check the canonical-record invariants.
    pub fn check_invariants(&self) -> DomainResult<()> {
        if self.amount.service_fee > self.amount.total {
            return Err(DomainError::validation("service fee exceeds total"));
        }
        if self.cancelled_at.is_some() != (self.status == BookingStatus::Cancelled) {
            return Err(DomainError::validation(
                "cancelled_at must be set exactly when status is cancelled",
            ));
        }
        if self.party_size == 0 {
            return Err(DomainError::validation("party size must be at least 1"));
        }
        if !crate::lifecycle::is_in_vocabulary(self.kind(), self.status) {
            return Err(DomainError::validation(format!(
                "status {} is not used by {}",
                self.status,
                self.kind()
            )));
        }
        Ok(())
    }
}
