use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;

use reservo_bookings::{BookingStatus, FilterQuery, PaymentStatus, ViewRequest};
use reservo_core::BookingId;

use crate::app::dto::{BookingDto, Envelope, PaymentStatusUpdateRequest, StatusUpdateRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_bookings))
        .route("/stats", get(booking_stats))
        .route("/export.csv", get(export_bookings))
        .route("/:id/status", put(update_status))
        .route("/:id/payment-status", put(update_payment_status))
        .route("/:id/reminder", post(send_reminder))
}

fn view_request(query: &FilterQuery) -> Result<ViewRequest, axum::response::Response> {
    ViewRequest::try_from(query).map_err(errors::domain_error_to_response)
}

fn booking_id(raw: &str) -> Result<BookingId, axum::response::Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    payload.map(|Json(b)| b).map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text())
    })
}

pub async fn list_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<FilterQuery>,
) -> axum::response::Response {
    let request = match view_request(&query) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.bookings.list(&request, Utc::now()) {
        Ok(rows) => {
            let data: Vec<BookingDto<'_>> = rows.iter().map(BookingDto::from).collect();
            (StatusCode::OK, Json(Envelope::ok(data))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn booking_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<FilterQuery>,
) -> axum::response::Response {
    let request = match view_request(&query) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.bookings.stats(&request.criteria, Utc::now()) {
        Ok(report) => (StatusCode::OK, Json(Envelope::ok(report))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn export_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<FilterQuery>,
) -> axum::response::Response {
    let request = match view_request(&query) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services
        .bookings
        .export_csv(&request.criteria, request.sort, Utc::now())
    {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"bookings.csv\""),
            ],
            csv,
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match booking_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let target: BookingStatus = match body.status.parse() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.bookings.transition_status(&id, target, Utc::now()) {
        Ok(b) => (StatusCode::OK, Json(BookingDto::from(&b))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_payment_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<PaymentStatusUpdateRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match booking_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let target: PaymentStatus = match body.payment_status.parse() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.bookings.transition_payment(&id, target, Utc::now()) {
        Ok(b) => (StatusCode::OK, Json(BookingDto::from(&b))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn send_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match booking_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.bookings.send_reminder(&id, Utc::now()) {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
