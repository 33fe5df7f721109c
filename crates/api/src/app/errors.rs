use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use reservo_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::IllegalTransition { .. } | DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Adaptation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Transport(_) => StatusCode::BAD_GATEWAY,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed upstream");
    }
    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
