use axum::Router;

pub mod bookings;
pub mod system;

/// Router for every booking endpoint.
pub fn router() -> Router {
    Router::new().nest("/bookings", bookings::router())
}
