//! Raw upstream records → canonical [`Booking`].
//!
//! Every field of a raw record is optional at the serde level so that a
//! missing value surfaces as an [`AdaptationError`] naming that field instead
//! of an opaque deserialization failure. Optional fields fall back to the
//! documented defaults below; nothing here is random.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use reservo_core::{BookingId, DomainError, Money, PartyId, ProviderId, SubjectId};

use crate::booking::*;
use crate::lifecycle;

/// Thumbnail used when the upstream subject carries no image.
pub const PLACEHOLDER_THUMBNAIL: &str = "/static/placeholder.jpg";

/// Currency assumed when the upstream record omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A raw record could not be turned into a canonical booking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {kind} record {record:?}: missing or invalid field `{field}`")]
pub struct AdaptationError {
    pub kind: BookingKind,
    pub field: Cow<'static, str>,
    /// Upstream id when the record had one.
    pub record: Option<String>,
}

impl From<AdaptationError> for DomainError {
    fn from(err: AdaptationError) -> Self {
        DomainError::adaptation(err.kind.as_str(), err.field)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParty {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "name", alias = "fullName")]
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProvider {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "name")]
    pub display_name: Option<String>,
}

/// Fields shared by every reservation kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommon {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "bookingReference", alias = "orderNumber")]
    pub confirmation_code: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(alias = "totalPrice")]
    pub total_amount: Option<u64>,
    pub service_fee: Option<u64>,
    pub currency: Option<String>,
    #[serde(alias = "user", alias = "guest")]
    pub customer: Option<RawParty>,
    #[serde(alias = "host", alias = "owner", alias = "seller")]
    pub provider: Option<RawProvider>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "pricePerNight")]
    pub price: Option<u64>,
    #[serde(alias = "maxGuests")]
    pub capacity: Option<u32>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub views: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGuests {
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub infants: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLodging {
    #[serde(flatten)]
    pub common: RawCommon,
    pub listing: Option<RawListing>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub guests: Option<RawGuests>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlace {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "name")]
    pub title: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "ticketPrice")]
    pub price: Option<u64>,
    pub capacity: Option<u32>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub views: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVenueTicket {
    #[serde(flatten)]
    pub common: RawCommon,
    pub place: Option<RawPlace>,
    pub visit_date: Option<NaiveDate>,
    /// `HH:MM` or `HH:MM:SS`, local to the venue; treated as UTC.
    pub visit_time: Option<String>,
    pub number_of_tickets: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlightInfo {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "airline")]
    pub carrier: Option<String>,
    pub flight_number: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure: Option<DateTime<Utc>>,
    pub arrival: Option<DateTime<Utc>>,
    pub price: Option<u64>,
    #[serde(alias = "totalSeats")]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlight {
    #[serde(flatten)]
    pub common: RawCommon,
    pub flight: Option<RawFlightInfo>,
    pub passenger_count: Option<u32>,
    #[serde(default)]
    pub passengers: Vec<serde_json::Value>,
    pub cabin_class: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    #[serde(alias = "product")]
    pub product_id: Option<String>,
    #[serde(alias = "name")]
    pub title: Option<String>,
    #[serde(alias = "price")]
    pub unit_price: Option<u64>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAddress {
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMerchandiseOrder {
    #[serde(flatten)]
    pub common: RawCommon,
    #[serde(default)]
    pub items: Vec<RawLineItem>,
    pub shipping_address: Option<RawAddress>,
}

/// A raw record of one specific reservation kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RawRecord {
    Lodging(RawLodging),
    VenueTicket(RawVenueTicket),
    Flight(RawFlight),
    MerchandiseOrder(RawMerchandiseOrder),
}

impl RawRecord {
    pub fn kind(&self) -> BookingKind {
        match self {
            RawRecord::Lodging(_) => BookingKind::Lodging,
            RawRecord::VenueTicket(_) => BookingKind::VenueTicket,
            RawRecord::Flight(_) => BookingKind::Flight,
            RawRecord::MerchandiseOrder(_) => BookingKind::MerchandiseOrder,
        }
    }

    fn common(&self) -> &RawCommon {
        match self {
            RawRecord::Lodging(r) => &r.common,
            RawRecord::VenueTicket(r) => &r.common,
            RawRecord::Flight(r) => &r.common,
            RawRecord::MerchandiseOrder(r) => &r.common,
        }
    }
}

/// Result of adapting a batch: accepted bookings plus what was dropped.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub bookings: Vec<Booking>,
    pub rejected: Vec<AdaptationError>,
}

/// Parse a JSON object of a known kind (the endpoint decides the kind).
pub fn normalize_value(value: &serde_json::Value, kind: BookingKind) -> Result<Booking, AdaptationError> {
    let record = |field: Cow<'static, str>| AdaptationError {
        kind,
        field,
        record: value
            .get("id")
            .or_else(|| value.get("_id"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
    };
    let raw = decode(value, kind).map_err(|e| {
        tracing::debug!(%kind, error = %e, "raw record has a field of the wrong type");
        let field = offending_field(value, kind).map_or(Cow::Borrowed("record"), Cow::Owned);
        record(field)
    })?;
    normalize(&raw)
}

fn decode(value: &serde_json::Value, kind: BookingKind) -> serde_json::Result<RawRecord> {
    match kind {
        BookingKind::Lodging => serde_json::from_value(value.clone()).map(RawRecord::Lodging),
        BookingKind::VenueTicket => serde_json::from_value(value.clone()).map(RawRecord::VenueTicket),
        BookingKind::Flight => serde_json::from_value(value.clone()).map(RawRecord::Flight),
        BookingKind::MerchandiseOrder => {
            serde_json::from_value(value.clone()).map(RawRecord::MerchandiseOrder)
        }
    }
}

/// First top-level key whose value fails to decode on its own. Every raw
/// field is optional, so a one-key object only fails on a type mismatch.
fn offending_field(value: &serde_json::Value, kind: BookingKind) -> Option<String> {
    let object = value.as_object()?;
    object.iter().find_map(|(key, field)| {
        let mut single = serde_json::Map::new();
        single.insert(key.clone(), field.clone());
        decode(&serde_json::Value::Object(single), kind)
            .is_err()
            .then(|| key.clone())
    })
}

/// Adapt one raw record. Pure: the same input always yields the same booking.
pub fn normalize(raw: &RawRecord) -> Result<Booking, AdaptationError> {
    let kind = raw.kind();
    let common = raw.common();
    let ctx = Ctx {
        kind,
        record: common.id.clone(),
    };

    let (subject, occurs_at, party_size, computed_total) = match raw {
        RawRecord::Lodging(r) => adapt_lodging(&ctx, r)?,
        RawRecord::VenueTicket(r) => adapt_venue(&ctx, r)?,
        RawRecord::Flight(r) => adapt_flight(&ctx, r)?,
        RawRecord::MerchandiseOrder(r) => adapt_order(&ctx, r)?,
    };

    let id = ctx.require_str(common.id.as_deref(), "id")?;
    let confirmation_code = ctx.require_str(common.confirmation_code.as_deref(), "confirmationCode")?;
    let created_at = ctx.require(common.created_at, "createdAt")?;

    let status = match common.status.as_deref() {
        None => BookingStatus::Pending,
        Some(s) => s
            .parse::<BookingStatus>()
            .ok()
            .filter(|st| lifecycle::is_in_vocabulary(kind, *st))
            .ok_or_else(|| ctx.error("status"))?,
    };
    let payment_status = match common.payment_status.as_deref() {
        None => PaymentStatus::Pending,
        Some(s) => s.parse().map_err(|_| ctx.error("paymentStatus"))?,
    };
    let updated_at = common.updated_at.unwrap_or(created_at);

    // Keep `cancelled_at` in lockstep with the status even if upstream drifted.
    let cancelled_at = match status {
        BookingStatus::Cancelled => Some(common.cancelled_at.unwrap_or(updated_at)),
        _ => None,
    };

    let service_fee = Money::from_minor(common.service_fee.unwrap_or(0));
    let total = match computed_total {
        // Orders are priced by their line items alone.
        Some(items_total) => items_total,
        None => Money::from_minor(ctx.require(common.total_amount, "totalAmount")?),
    };
    if service_fee > total {
        return Err(ctx.error("amount.serviceFee"));
    }

    let party = match &common.customer {
        None => None,
        Some(p) => Some(Party {
            id: PartyId::new(ctx.require_str(p.id.as_deref(), "customer.id")?),
            display_name: p.display_name.clone().unwrap_or_default(),
            email: p.email.clone().unwrap_or_default(),
            phone: p.phone.clone(),
        }),
    };
    let provider = match &common.provider {
        None => None,
        Some(p) => Some(Provider {
            id: ProviderId::new(ctx.require_str(p.id.as_deref(), "provider.id")?),
            display_name: p.display_name.clone().unwrap_or_default(),
        }),
    };

    Ok(Booking {
        id: BookingId::new(id),
        confirmation_code,
        status,
        payment_status,
        created_at,
        updated_at,
        cancelled_at,
        occurs_at,
        party_size,
        amount: Amount {
            total,
            service_fee,
            currency: common
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        },
        party,
        provider,
        payment_method: common.payment_method.clone(),
        subject,
        special_requests: common.special_requests.clone(),
        version: 0,
    })
}

/// Adapt a batch, dropping and logging malformed records.
///
/// One bad record never aborts the batch.
pub fn normalize_batch<I>(raws: I) -> BatchOutcome
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut out = BatchOutcome::default();
    for raw in raws {
        match normalize(&raw) {
            Ok(b) => out.bookings.push(b),
            Err(e) => {
                tracing::warn!(kind = %e.kind, field = %e.field, record = ?e.record, "dropping malformed booking record");
                out.rejected.push(e);
            }
        }
    }
    out
}

type Adapted = (Subject, Period, u32, Option<Money>);

struct Ctx {
    kind: BookingKind,
    record: Option<String>,
}

impl Ctx {
    fn error(&self, field: &'static str) -> AdaptationError {
        AdaptationError {
            kind: self.kind,
            field: Cow::Borrowed(field),
            record: self.record.clone(),
        }
    }

    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T, AdaptationError> {
        value.ok_or_else(|| self.error(field))
    }

    fn require_str(&self, value: Option<&str>, field: &'static str) -> Result<String, AdaptationError> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(self.error(field)),
        }
    }
}

fn thumbnail(explicit: &Option<String>, images: &[String]) -> String {
    explicit
        .clone()
        .or_else(|| images.first().cloned())
        .unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string())
}

/// Whole nights between check-in and check-out, rounded up, never below 1.
pub fn nights_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> u32 {
    const DAY: i64 = 86_400;
    let secs = (check_out - check_in).num_seconds();
    if secs <= 0 {
        return 1;
    }
    u32::try_from((secs + DAY - 1) / DAY).unwrap_or(u32::MAX)
}

fn adapt_lodging(ctx: &Ctx, r: &RawLodging) -> Result<Adapted, AdaptationError> {
    let listing = ctx.require(r.listing.as_ref(), "listing")?;
    let check_in = ctx.require(r.check_in, "checkIn")?;
    let check_out = ctx.require(r.check_out, "checkOut")?;
    let guests = ctx.require(r.guests.as_ref(), "guests")?;
    let guests = GuestBreakdown {
        adults: guests.adults.unwrap_or(0),
        children: guests.children.unwrap_or(0),
        infants: guests.infants.unwrap_or(0),
    };
    if guests.total() == 0 {
        return Err(ctx.error("guests"));
    }

    let subject = Subject::Lodging(LodgingSubject {
        listing_id: SubjectId::new(ctx.require_str(listing.id.as_deref(), "listing.id")?),
        title: listing.title.clone().unwrap_or_default(),
        location: listing.location.clone().unwrap_or_default(),
        nightly_price: Money::from_minor(listing.price.unwrap_or(0)),
        capacity: listing.capacity,
        thumbnail: thumbnail(&listing.thumbnail, &listing.images),
        views: listing.views.unwrap_or(0),
        guests,
        nights: nights_between(check_in, check_out),
    });
    let period = Period {
        start: check_in,
        end: Some(check_out),
    };
    Ok((subject, period, guests.total(), None))
}

fn adapt_venue(ctx: &Ctx, r: &RawVenueTicket) -> Result<Adapted, AdaptationError> {
    let place = ctx.require(r.place.as_ref(), "place")?;
    let date = ctx.require(r.visit_date, "visitDate")?;
    let time = match r.visit_time.as_deref() {
        None => NaiveTime::MIN,
        Some(t) => NaiveTime::parse_from_str(t.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t.trim(), "%H:%M:%S"))
            .map_err(|_| ctx.error("visitTime"))?,
    };
    let tickets = ctx.require(r.number_of_tickets, "numberOfTickets")?;
    if tickets == 0 {
        return Err(ctx.error("numberOfTickets"));
    }

    let subject = Subject::VenueTicket(VenueSubject {
        place_id: SubjectId::new(ctx.require_str(place.id.as_deref(), "place.id")?),
        title: place.title.clone().unwrap_or_default(),
        location: place.location.clone().unwrap_or_default(),
        ticket_price: Money::from_minor(place.price.unwrap_or(0)),
        capacity: place.capacity,
        thumbnail: thumbnail(&place.thumbnail, &place.images),
        views: place.views.unwrap_or(0),
        tickets,
        visit_time: r.visit_time.clone(),
    });
    let period = Period {
        start: date.and_time(time).and_utc(),
        end: None,
    };
    Ok((subject, period, tickets, None))
}

fn adapt_flight(ctx: &Ctx, r: &RawFlight) -> Result<Adapted, AdaptationError> {
    let flight = ctx.require(r.flight.as_ref(), "flight")?;
    let departure = ctx.require(flight.departure, "flight.departure")?;
    let passengers = match r.passenger_count {
        Some(n) => n,
        None => u32::try_from(r.passengers.len()).unwrap_or(u32::MAX),
    };
    if passengers == 0 {
        return Err(ctx.error("passengerCount"));
    }

    let subject = Subject::Flight(FlightSubject {
        flight_id: SubjectId::new(ctx.require_str(flight.id.as_deref(), "flight.id")?),
        carrier: flight.carrier.clone().unwrap_or_default(),
        flight_number: flight.flight_number.clone().unwrap_or_default(),
        origin: flight.origin.clone().unwrap_or_default(),
        destination: flight.destination.clone().unwrap_or_default(),
        seat_price: Money::from_minor(flight.price.unwrap_or(0)),
        capacity: flight.capacity,
        cabin_class: r.cabin_class.clone(),
        passengers,
    });
    let period = Period {
        start: departure,
        end: flight.arrival,
    };
    Ok((subject, period, passengers, None))
}

fn adapt_order(ctx: &Ctx, r: &RawMerchandiseOrder) -> Result<Adapted, AdaptationError> {
    if r.items.is_empty() {
        return Err(ctx.error("items"));
    }
    let mut items = Vec::with_capacity(r.items.len());
    for raw in &r.items {
        let quantity = ctx.require(raw.quantity, "items.quantity")?;
        if quantity == 0 {
            return Err(ctx.error("items.quantity"));
        }
        items.push(LineItem {
            product_id: SubjectId::new(ctx.require_str(raw.product_id.as_deref(), "items.productId")?),
            title: raw.title.clone().unwrap_or_default(),
            unit_price: Money::from_minor(ctx.require(raw.unit_price, "items.unitPrice")?),
            quantity,
        });
    }
    let total: Money = items.iter().map(LineItem::subtotal).sum();
    let placed_at = ctx.require(r.common.created_at, "createdAt")?;

    let subject = Subject::MerchandiseOrder(MerchandiseSubject {
        items,
        shipping_city: r.shipping_address.as_ref().and_then(|a| a.city.clone()),
    });
    let period = Period {
        start: placed_at,
        end: None,
    };
    Ok((subject, period, 1, Some(total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn lodging_json() -> serde_json::Value {
        json!({
            "_id": "bk-100",
            "confirmationCode": "LDG-100",
            "status": "confirmed",
            "paymentStatus": "paid",
            "createdAt": "2025-05-01T09:00:00Z",
            "totalAmount": 66000,
            "serviceFee": 6000,
            "currency": "EUR",
            "user": { "_id": "u-1", "name": "Ana Lima", "email": "ana@example.com" },
            "host": { "_id": "h-1", "name": "Coastline Hosts" },
            "listing": { "_id": "l-1", "title": "Harbour Loft", "location": "Porto", "pricePerNight": 20000, "maxGuests": 4 },
            "checkIn": "2025-07-01T15:00:00Z",
            "checkOut": "2025-07-04T11:00:00Z",
            "guests": { "adults": 2, "children": 1 }
        })
    }

    #[test]
    fn lodging_derives_party_size_and_nights() {
        let b = normalize_value(&lodging_json(), BookingKind::Lodging).unwrap();
        assert_eq!(b.kind(), BookingKind::Lodging);
        assert_eq!(b.party_size, 3);
        assert_eq!(b.status(), BookingStatus::Confirmed);
        assert_eq!(b.payment_status(), PaymentStatus::Paid);
        assert_eq!(b.amount.total, Money::from_minor(66000));
        assert_eq!(b.amount.currency, "EUR");
        assert_eq!(b.updated_at(), b.created_at);
        match &b.subject {
            Subject::Lodging(s) => {
                // 2 days 20 hours rounds up to 3 nights.
                assert_eq!(s.nights, 3);
                assert_eq!(s.thumbnail, PLACEHOLDER_THUMBNAIL);
                assert_eq!(s.views, 0);
                assert_eq!(s.guests.infants, 0);
            }
            other => panic!("expected lodging subject, got {other:?}"),
        }
    }

    #[test]
    fn nights_clamp_to_one_when_checkout_not_after_checkin() {
        let t = Utc.with_ymd_and_hms(2025, 7, 1, 15, 0, 0).unwrap();
        assert_eq!(nights_between(t, t), 1);
        assert_eq!(nights_between(t, t - chrono::Duration::days(2)), 1);
        assert_eq!(nights_between(t, t + chrono::Duration::days(2)), 2);
    }

    #[test]
    fn venue_ticket_combines_date_and_time() {
        let raw = json!({
            "id": "bk-200",
            "confirmationCode": "VEN-200",
            "createdAt": "2025-05-01T09:00:00Z",
            "totalAmount": 8000,
            "place": { "id": "p-1", "name": "Old Town Museum", "views": 7 },
            "visitDate": "2025-06-10",
            "visitTime": "10:30",
            "numberOfTickets": 2
        });
        let b = normalize_value(&raw, BookingKind::VenueTicket).unwrap();
        assert_eq!(b.party_size, 2);
        assert_eq!(b.status(), BookingStatus::Pending);
        assert_eq!(
            b.occurs_at.start,
            Utc.with_ymd_and_hms(2025, 6, 10, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn flight_uses_departure_and_arrival() {
        let raw = json!({
            "id": "bk-300",
            "bookingReference": "PNR300",
            "createdAt": "2025-05-01T09:00:00Z",
            "totalAmount": 40000,
            "flight": {
                "id": "f-1", "airline": "TAP", "flightNumber": "TP1024",
                "origin": "LIS", "destination": "MAD",
                "departure": "2025-06-20T08:00:00Z", "arrival": "2025-06-20T10:30:00Z",
                "totalSeats": 180
            },
            "passengers": [{ "name": "A" }, { "name": "B" }]
        });
        let b = normalize_value(&raw, BookingKind::Flight).unwrap();
        assert_eq!(b.party_size, 2);
        assert_eq!(b.confirmation_code, "PNR300");
        assert_eq!(
            b.occurs_at.end,
            Some(Utc.with_ymd_and_hms(2025, 6, 20, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn merchandise_total_comes_from_line_items() {
        let raw = json!({
            "id": "ord-1",
            "orderNumber": "ORD-1",
            "status": "shipped",
            "createdAt": "2025-05-01T09:00:00Z",
            "totalAmount": 1,
            "items": [
                { "productId": "sku-1", "name": "Tote", "price": 1500, "quantity": 2 },
                { "productId": "sku-2", "name": "Poster", "price": 1000, "quantity": 1 }
            ]
        });
        let b = normalize_value(&raw, BookingKind::MerchandiseOrder).unwrap();
        assert_eq!(b.party_size, 1);
        assert_eq!(b.amount.total, Money::from_minor(4000));
        assert_eq!(b.amount.service_fee, Money::ZERO);
        assert_eq!(b.status(), BookingStatus::Shipped);
    }

    #[test]
    fn merchandise_fee_does_not_inflate_the_item_total() {
        let raw = json!({
            "id": "ord-2",
            "orderNumber": "ORD-2",
            "createdAt": "2025-05-01T09:00:00Z",
            "serviceFee": 500,
            "items": [
                { "productId": "sku-1", "name": "Tote", "price": 1500, "quantity": 2 },
                { "productId": "sku-2", "name": "Poster", "price": 1000, "quantity": 1 }
            ]
        });
        let b = normalize_value(&raw, BookingKind::MerchandiseOrder).unwrap();
        assert_eq!(b.amount.total, Money::from_minor(4000));
        assert_eq!(b.amount.service_fee, Money::from_minor(500));
    }

    #[test]
    fn merchandise_fee_above_item_total_is_rejected() {
        let raw = json!({
            "id": "ord-3",
            "orderNumber": "ORD-3",
            "createdAt": "2025-05-01T09:00:00Z",
            "serviceFee": 2000,
            "items": [{ "productId": "sku-1", "price": 1500, "quantity": 1 }]
        });
        let err = normalize_value(&raw, BookingKind::MerchandiseOrder).unwrap_err();
        assert_eq!(err.field, "amount.serviceFee");
    }

    #[test]
    fn visit_time_accepts_seconds() {
        let raw = json!({
            "id": "bk-201",
            "confirmationCode": "VEN-201",
            "createdAt": "2025-05-01T09:00:00Z",
            "totalAmount": 4000,
            "place": { "id": "p-1" },
            "visitDate": "2025-06-10",
            "visitTime": "10:30:00",
            "numberOfTickets": 1
        });
        let b = normalize_value(&raw, BookingKind::VenueTicket).unwrap();
        assert_eq!(
            b.occurs_at.start,
            Utc.with_ymd_and_hms(2025, 6, 10, 10, 30, 0).unwrap()
        );

        let mut raw = raw;
        raw["visitTime"] = json!("half past ten");
        assert_eq!(
            normalize_value(&raw, BookingKind::VenueTicket).unwrap_err().field,
            "visitTime"
        );
    }

    #[test]
    fn nested_type_error_names_the_enclosing_field() {
        let mut raw = lodging_json();
        raw["listing"]["price"] = json!("cheap");
        let err = normalize_value(&raw, BookingKind::Lodging).unwrap_err();
        assert_eq!(err.field, "listing");
    }

    #[test]
    fn missing_required_field_is_named() {
        let mut raw = lodging_json();
        raw.as_object_mut().unwrap().remove("checkIn");
        let err = normalize_value(&raw, BookingKind::Lodging).unwrap_err();
        assert_eq!(err.field, "checkIn");
        assert_eq!(err.record.as_deref(), Some("bk-100"));

        let mut raw = lodging_json();
        raw["guests"] = json!({});
        assert_eq!(normalize_value(&raw, BookingKind::Lodging).unwrap_err().field, "guests");
    }

    #[test]
    fn status_outside_kind_vocabulary_is_rejected() {
        let mut raw = lodging_json();
        raw["status"] = json!("shipped");
        assert_eq!(normalize_value(&raw, BookingKind::Lodging).unwrap_err().field, "status");
    }

    #[test]
    fn fee_above_total_is_rejected() {
        let mut raw = lodging_json();
        raw["serviceFee"] = json!(70000);
        assert_eq!(
            normalize_value(&raw, BookingKind::Lodging).unwrap_err().field,
            "amount.serviceFee"
        );
    }

    #[test]
    fn cancelled_at_follows_status() {
        let mut raw = lodging_json();
        raw["status"] = json!("cancelled");
        raw["updatedAt"] = json!("2025-05-02T10:00:00Z");
        let b = normalize_value(&raw, BookingKind::Lodging).unwrap();
        assert_eq!(b.cancelled_at(), Some(b.updated_at()));

        let mut raw = lodging_json();
        raw["cancelledAt"] = json!("2025-05-02T10:00:00Z");
        let b = normalize_value(&raw, BookingKind::Lodging).unwrap();
        assert_eq!(b.cancelled_at(), None);
        assert!(b.check_invariants().is_ok());
    }

    #[test]
    fn batch_drops_bad_records_and_keeps_the_rest() {
        let good: RawRecord = serde_json::from_value({
            let mut v = lodging_json();
            v["kind"] = json!("lodging");
            v
        })
        .unwrap();
        let bad = RawRecord::Flight(RawFlight::default());

        let out = normalize_batch(vec![good, bad]);
        assert_eq!(out.bookings.len(), 1);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].kind, BookingKind::Flight);
    }

    #[test]
    fn wrong_json_type_is_an_adaptation_error() {
        let mut raw = lodging_json();
        raw["totalAmount"] = json!("lots");
        let err = normalize_value(&raw, BookingKind::Lodging).unwrap_err();
        assert_eq!(err.field, "totalAmount");
        let domain: DomainError = err.into();
        assert_eq!(domain.code(), "adaptation_error");
    }
}
