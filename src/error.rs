use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Domain errors, translated to an HTTP status and a JSON `message` body at
/// the request boundary. Messages are user-facing and shown verbatim by the
/// client, hence Indonesian.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Anda sudah melakukan check-in hari ini.")]
    DuplicateSession,

    #[display(fmt = "Tidak ditemukan catatan check-in aktif.")]
    NoActiveSession,

    #[display(fmt = "Anda berada di luar radius! ({:.2}m)", distance_m)]
    OutOfRange { distance_m: f64 },

    #[display(fmt = "Silakan ambil foto dulu sebelum presensi.")]
    MissingEvidence,

    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "Terjadi kesalahan server")]
    Internal,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateSession
            | ApiError::OutOfRange { .. }
            | ApiError::MissingEvidence => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NoActiveSession | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        ApiError::Internal
    }
}

/// true when the database rejected a write with a duplicate-key violation
pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(ApiError::DuplicateSession.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::OutOfRange { distance_m: 500.3 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MissingEvidence.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoActiveSession.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unauthorized("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("admin only".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn out_of_range_message_carries_distance() {
        let msg = ApiError::OutOfRange { distance_m: 500.347 }.to_string();
        assert_eq!(msg, "Anda berada di luar radius! (500.35m)");
    }

    #[test]
    fn internal_error_does_not_leak_details() {
        assert_eq!(ApiError::Internal.to_string(), "Terjadi kesalahan server");
    }
}
