//! CSV rendering of a booking view.
//!
//! Every field is quoted, embedded quotes are doubled, rows are joined with
//! `\n` and there is no trailing newline. Output depends only on the input
//! rows and the column list, so identical input gives identical bytes.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use reservo_core::{DomainError, DomainResult};

use crate::booking::Booking;

/// One output column: a header and how to read the cell from a booking.
#[derive(Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub accessor: fn(&Booking) -> String,
}

impl Column {
    pub const fn new(header: &'static str, accessor: fn(&Booking) -> String) -> Self {
        Self { header, accessor }
    }
}

impl core::fmt::Debug for Column {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Column").field(&self.header).finish()
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The dashboard export layout.
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("Confirmation Code", |b| b.confirmation_code.clone()),
        Column::new("Customer Name", |b| {
            b.party
                .as_ref()
                .map_or_else(|| "Guest".to_string(), |p| p.display_name.clone())
        }),
        Column::new("Email", |b| {
            b.party.as_ref().map(|p| p.email.clone()).unwrap_or_default()
        }),
        Column::new("Phone", |b| {
            b.party
                .as_ref()
                .and_then(|p| p.phone.clone())
                .unwrap_or_default()
        }),
        Column::new("Subject Title", |b| b.subject.display_name()),
        Column::new("Subject Kind", |b| b.kind().as_str().to_string()),
        Column::new("Location", |b| b.subject.location()),
        Column::new("Provider", |b| {
            b.provider
                .as_ref()
                .map(|p| p.display_name.clone())
                .unwrap_or_default()
        }),
        Column::new("Period Start", |b| timestamp(b.occurs_at.start)),
        Column::new("Period End", |b| {
            b.occurs_at.end.map(timestamp).unwrap_or_default()
        }),
        Column::new("Duration", |b| b.subject.duration_label(&b.occurs_at)),
        Column::new("Party Size", |b| b.subject.party_breakdown(b.party_size)),
        Column::new("Total Amount", |b| b.amount.total.to_major_string()),
        Column::new("Service Fee", |b| b.amount.service_fee.to_major_string()),
        Column::new("Status", |b| b.status().as_str().to_string()),
        Column::new("Payment Status", |b| b.payment_status().as_str().to_string()),
        Column::new("Payment Method", |b| b.payment_method.clone().unwrap_or_default()),
        Column::new("Created Date", |b| b.created_at.format("%Y-%m-%d").to_string()),
    ]
}

fn export_failed(err: impl core::fmt::Display) -> DomainError {
    DomainError::validation(format!("csv export failed: {err}"))
}

/// Render `bookings` under `columns`, header row first.
pub fn to_csv<'a, I>(bookings: I, columns: &[Column]) -> DomainResult<String>
where
    I: IntoIterator<Item = &'a Booking>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|c| c.header))
        .map_err(export_failed)?;
    for booking in bookings {
        writer
            .write_record(columns.iter().map(|c| (c.accessor)(booking)))
            .map_err(export_failed)?;
    }

    let bytes = writer.into_inner().map_err(export_failed)?;
    let mut out = String::from_utf8(bytes).map_err(export_failed)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BookingStatus;
    use crate::testing;

    #[test]
    fn header_row_is_quoted_and_ordered() {
        let csv = to_csv(std::iter::empty(), &default_columns()).unwrap();
        assert!(!csv.contains('\n'));
        assert!(csv.starts_with(r#""Confirmation Code","Customer Name","Email","Phone""#));
        assert!(csv.ends_with(r#""Payment Method","Created Date""#));
        assert_eq!(default_columns().len(), 18);
    }

    #[test]
    fn renders_one_row_per_booking() {
        let a = testing::lodging("a", BookingStatus::Confirmed, 600_00);
        let d = testing::merchandise("d", BookingStatus::Shipped);
        let csv = to_csv([&a, &d], &default_columns()).unwrap();

        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with(r#""CONF-A","Customer a","a@example.com","","Harbour Loft","lodging","Porto""#));
        assert!(lines[1].contains(r#""3 nights","2 adults, 1 child, 0 infants","600.00","60.00","confirmed","pending","card","2025-05-29""#));
        assert!(lines[2].contains(r#""Tote bag; Poster","merchandiseOrder","Braga""#));
        assert!(lines[2].contains(r#""3 items","1 customer","40.00","0.00","shipped""#));
    }

    #[test]
    fn guest_bookings_export_placeholder_name() {
        let mut b = testing::venue("b", BookingStatus::Pending, 80_00);
        b.party = None;
        let columns = [default_columns()[1]];
        assert_eq!(to_csv([&b], &columns).unwrap(), "\"Customer Name\"\n\"Guest\"");
    }

    #[test]
    fn commas_and_quotes_survive_a_round_trip() {
        let mut a = testing::lodging("a", BookingStatus::Confirmed, 600_00);
        let tricky = r#"Smith, "Jo""#;
        if let Some(party) = a.party.as_mut() {
            party.display_name = tricky.to_string();
        }
        let c = testing::flight("c", BookingStatus::Pending, 400_00);

        let csv = to_csv([&a, &c], &default_columns()).unwrap();
        assert!(csv.contains(r#""Smith, ""Jo""""#));

        let mut reader = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 18);
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], tricky);
        assert_eq!(&rows[1][4], "LIS → MAD");
        assert_eq!(&rows[1][10], "2h 30m");
    }

    #[test]
    fn output_is_byte_stable() {
        let all = [
            testing::lodging("a", BookingStatus::Confirmed, 600_00),
            testing::venue("b", BookingStatus::Pending, 80_00),
        ];
        let columns = default_columns();
        assert_eq!(to_csv(&all, &columns).unwrap(), to_csv(&all, &columns).unwrap());
    }
}
