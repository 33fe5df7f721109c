use serde::{Deserialize, Serialize};

use reservo_bookings::{Booking, BookingKind};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdateRequest {
    pub payment_status: String,
}

// -------------------------
// Response DTOs
// -------------------------

/// Canonical booking with its kind lifted to the top level.
#[derive(Debug, Serialize)]
pub struct BookingDto<'a> {
    pub kind: BookingKind,
    #[serde(flatten)]
    pub booking: &'a Booking,
}

impl<'a> From<&'a Booking> for BookingDto<'a> {
    fn from(booking: &'a Booking) -> Self {
        Self {
            kind: booking.kind(),
            booking,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
