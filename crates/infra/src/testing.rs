//! Bookings built through the adapter, the same way production ingests them.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use reservo_bookings::{Booking, BookingKind, BookingStatus, normalize_value};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn stay_at(id: &str, code: &str, status: BookingStatus, check_in: DateTime<Utc>) -> Booking {
    let raw = json!({
        "id": id,
        "confirmationCode": code,
        "status": status.as_str(),
        "createdAt": now() - Duration::days(3),
        "totalAmount": 600_00,
        "serviceFee": 60_00,
        "customer": { "id": "u-1", "displayName": "Ana Lima", "email": "ana@example.com" },
        "host": { "id": "host-1", "name": "Coastline Hosts" },
        "listing": { "id": "listing-1", "title": "Harbour Loft", "location": "Porto", "price": 200_00, "capacity": 4 },
        "checkIn": check_in,
        "checkOut": check_in + Duration::days(3),
        "guests": { "adults": 2 },
    });
    normalize_value(&raw, BookingKind::Lodging).unwrap()
}

pub fn stay(id: &str, code: &str, status: BookingStatus) -> Booking {
    stay_at(id, code, status, now() + Duration::days(10))
}

pub fn ticket(id: &str, code: &str, status: BookingStatus) -> Booking {
    let raw = json!({
        "id": id,
        "confirmationCode": code,
        "status": status.as_str(),
        "createdAt": now() - Duration::days(1),
        "totalAmount": 80_00,
        "place": { "id": "place-1", "name": "Old Town Museum", "location": "Lisbon", "price": 40_00 },
        "visitDate": "2025-06-03",
        "visitTime": "10:30",
        "numberOfTickets": 2,
    });
    normalize_value(&raw, BookingKind::VenueTicket).unwrap()
}
