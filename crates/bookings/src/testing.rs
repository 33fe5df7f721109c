//! Deterministic booking fixtures for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use reservo_core::{BookingId, Money, PartyId, ProviderId, SubjectId};

use crate::booking::*;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn base(id: &str, status: BookingStatus, total: u64, subject: Subject, start: DateTime<Utc>) -> Booking {
    let created = now() - Duration::days(3);
    Booking {
        id: BookingId::new(id),
        confirmation_code: format!("CONF-{}", id.to_uppercase()),
        status,
        payment_status: PaymentStatus::Pending,
        created_at: created,
        updated_at: created,
        cancelled_at: (status == BookingStatus::Cancelled).then_some(created),
        occurs_at: Period { start, end: None },
        party_size: 1,
        amount: Amount {
            total: Money::from_minor(total),
            service_fee: Money::from_minor(total / 10),
            currency: "USD".to_string(),
        },
        party: Some(Party {
            id: PartyId::new(format!("party-{id}")),
            display_name: format!("Customer {id}"),
            email: format!("{id}@example.com"),
            phone: None,
        }),
        provider: Some(Provider {
            id: ProviderId::new("prov-1"),
            display_name: "Coastline Hosts".to_string(),
        }),
        payment_method: Some("card".to_string()),
        subject,
        special_requests: None,
        version: 0,
    }
}

pub fn lodging(id: &str, status: BookingStatus, total: u64) -> Booking {
    let check_in = now() + Duration::days(10);
    let guests = GuestBreakdown {
        adults: 2,
        children: 1,
        infants: 0,
    };
    let subject = Subject::Lodging(LodgingSubject {
        listing_id: SubjectId::new("listing-1"),
        title: "Harbour Loft".to_string(),
        location: "Porto".to_string(),
        nightly_price: Money::from_minor(200_00),
        capacity: Some(4),
        thumbnail: "/static/placeholder.jpg".to_string(),
        views: 0,
        guests,
        nights: 3,
    });
    let mut b = base(id, status, total, subject, check_in);
    b.occurs_at.end = Some(check_in + Duration::days(3));
    b.party_size = guests.total();
    b
}

pub fn venue(id: &str, status: BookingStatus, total: u64) -> Booking {
    let subject = Subject::VenueTicket(VenueSubject {
        place_id: SubjectId::new("place-1"),
        title: "Old Town Museum".to_string(),
        location: "Lisbon".to_string(),
        ticket_price: Money::from_minor(40_00),
        capacity: Some(100),
        thumbnail: "/static/placeholder.jpg".to_string(),
        views: 12,
        tickets: 2,
        visit_time: Some("10:30".to_string()),
    });
    let mut b = base(id, status, total, subject, now() + Duration::days(2));
    b.party_size = 2;
    b
}

pub fn flight(id: &str, status: BookingStatus, total: u64) -> Booking {
    let departure = now() + Duration::days(5);
    let subject = Subject::Flight(FlightSubject {
        flight_id: SubjectId::new("flight-1"),
        carrier: "TAP".to_string(),
        flight_number: "TP1024".to_string(),
        origin: "LIS".to_string(),
        destination: "MAD".to_string(),
        seat_price: Money::from_minor(200_00),
        capacity: Some(180),
        cabin_class: Some("economy".to_string()),
        passengers: 2,
    });
    let mut b = base(id, status, total, subject, departure);
    b.occurs_at.end = Some(departure + Duration::minutes(150));
    b.party_size = 2;
    b
}

pub fn merchandise(id: &str, status: BookingStatus) -> Booking {
    let items = vec![
        LineItem {
            product_id: SubjectId::new("sku-1"),
            title: "Tote bag".to_string(),
            unit_price: Money::from_minor(15_00),
            quantity: 2,
        },
        LineItem {
            product_id: SubjectId::new("sku-2"),
            title: "Poster".to_string(),
            unit_price: Money::from_minor(10_00),
            quantity: 1,
        },
    ];
    let total: Money = items.iter().map(LineItem::subtotal).sum();
    let subject = Subject::MerchandiseOrder(MerchandiseSubject {
        items,
        shipping_city: Some("Braga".to_string()),
    });
    let mut b = base(id, status, total.minor(), subject, now() - Duration::days(3));
    b.amount.service_fee = Money::ZERO;
    b
}

pub fn starting_at(mut booking: Booking, start: DateTime<Utc>) -> Booking {
    booking.occurs_at.start = start;
    booking
}

pub fn created_at(mut booking: Booking, at: DateTime<Utc>) -> Booking {
    booking.created_at = at;
    booking.updated_at = at;
    booking
}
