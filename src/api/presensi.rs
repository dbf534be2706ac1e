use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::{ApiError, is_duplicate_key};
use crate::geo::GeoPoint;
use crate::utils::{db_utils, photo, wib};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use std::path::Path;
use utoipa::ToSchema;

/// Columns the owner may touch through the maintenance endpoint
const UPDATABLE_COLUMNS: &[&str] =
    &["check_in", "check_out", "latitude", "longitude", "bukti_foto"];

#[derive(Deserialize, ToSchema)]
pub struct PresensiReq {
    #[schema(example = -7.8068)]
    pub latitude: f64,
    #[schema(example = 110.3271)]
    pub longitude: f64,
    /// Webcam still as a `data:image/...;base64,` URL
    #[schema(example = "data:image/jpeg;base64,/9j/4AAQ...", nullable = true)]
    pub image: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PresensiSummary {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "Budi Santoso")]
    pub nama: String,
    #[schema(example = "2026-01-05 08:30:00+07:00")]
    pub check_in: String,
    #[schema(example = "2026-01-05 16:30:00+07:00", nullable = true)]
    pub check_out: Option<String>,
    #[schema(example = -7.8068)]
    pub latitude: f64,
    #[schema(example = 110.3271)]
    pub longitude: f64,
    #[schema(nullable = true)]
    pub bukti_foto: Option<String>,
}

// storage precision, ~1.1 cm
fn round7(v: f64) -> f64 {
    (v * 1e7).round() / 1e7
}

// A duplicate-key violation on a presensi write means the unique key on
// (user_id, open_session) fired: the user already has an open session.
fn map_presensi_write_err(e: sqlx::Error) -> ApiError {
    if is_duplicate_key(&e) {
        ApiError::DuplicateSession
    } else {
        tracing::error!(error = %e, "Presensi write failed");
        ApiError::Internal
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/presensi/check-in",
    request_body(
        content = PresensiReq,
        description = "Device coordinate and webcam photo",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Checked in", body = Object, example = json!({
            "message": "Halo Budi, check-in berhasil pada 08:30:00 WIB",
            "data": {
                "user_id": 42,
                "nama": "Budi",
                "check_in": "2026-01-05 08:30:00+07:00",
                "check_out": null,
                "latitude": -7.8068,
                "longitude": 110.3271,
                "bukti_foto": "d3b07384.jpg"
            }
        })),
        (status = 400, description = "Outside radius, no photo, or session already open", body = Object, example = json!({
            "message": "Anda sudah melakukan check-in hari ini."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<PresensiReq>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();

    let device = GeoPoint {
        lat: payload.latitude,
        lng: payload.longitude,
    };
    let check = config.geofence().evaluate(device);
    if !check.within {
        return Err(ApiError::OutOfRange {
            distance_m: check.distance_m,
        });
    }

    let image = payload
        .image
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::MissingEvidence)?;

    let upload_dir = Path::new(&config.upload_dir);
    let foto = photo::store_data_url(image, upload_dir)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let latitude = round7(payload.latitude);
    let longitude = round7(payload.longitude);

    let result = sqlx::query(
        r#"
        INSERT INTO presensi (user_id, check_in, latitude, longitude, bukti_foto)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(now)
    .bind(latitude)
    .bind(longitude)
    .bind(&foto)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = result {
        // the record was rejected, drop the orphaned photo
        photo::discard(upload_dir, &foto);
        return Err(map_presensi_write_err(e));
    }

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": format!(
            "Halo {}, check-in berhasil pada {} WIB",
            auth.nama,
            wib::format_clock(now)
        ),
        "data": PresensiSummary {
            user_id: auth.user_id,
            nama: auth.nama,
            check_in: wib::format_timestamp(now),
            check_out: None,
            latitude,
            longitude,
            bukti_foto: Some(foto),
        }
    })))
}

#[derive(sqlx::FromRow)]
struct OpenSession {
    id: u64,
    check_in: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    bukti_foto: Option<String>,
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/presensi/check-out",
    request_body(
        content = PresensiReq,
        description = "Device coordinate; photo only when CHECKOUT_REQUIRES_PHOTO is on",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Checked out", body = Object, example = json!({
            "message": "Selamat jalan Budi, check-out berhasil pada 16:30:00 WIB"
        })),
        (status = 400, description = "Outside radius or photo required", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No open session", body = Object, example = json!({
            "message": "Tidak ditemukan catatan check-in aktif."
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<PresensiReq>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();

    let device = GeoPoint {
        lat: payload.latitude,
        lng: payload.longitude,
    };
    let check = config.geofence().evaluate(device);
    if !check.within {
        return Err(ApiError::OutOfRange {
            distance_m: check.distance_m,
        });
    }

    if config.checkout_requires_photo {
        payload
            .image
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ApiError::MissingEvidence)?;
    }

    let open = sqlx::query_as::<_, OpenSession>(
        r#"
        SELECT id, check_in, latitude, longitude, bukti_foto
        FROM presensi
        WHERE user_id = ? AND check_out IS NULL
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(ApiError::NoActiveSession)?;

    // the IS NULL guard keeps a concurrent double check-out from both
    // succeeding
    let result = sqlx::query(
        r#"
        UPDATE presensi
        SET check_out = ?
        WHERE id = ? AND check_out IS NULL
        "#,
    )
    .bind(now)
    .bind(open.id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NoActiveSession);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!(
            "Selamat jalan {}, check-out berhasil pada {} WIB",
            auth.nama,
            wib::format_clock(now)
        ),
        "data": PresensiSummary {
            user_id: auth.user_id,
            nama: auth.nama,
            check_in: wib::format_timestamp(open.check_in),
            check_out: Some(wib::format_timestamp(now)),
            latitude: open.latitude,
            longitude: open.longitude,
            bukti_foto: open.bukti_foto,
        }
    })))
}

/// Owner-scoped partial update of a record
#[utoipa::path(
    put,
    path = "/api/presensi/{id}",
    params(
        ("id" = u64, Path, description = "Record ID")
    ),
    request_body(
        content = Object,
        description = "Subset of: check_in, check_out, latitude, longitude, bukti_foto",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Updated", body = Object, example = json!({
            "message": "Presensi berhasil diupdate"
        })),
        (status = 400, description = "Unknown column or empty payload"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found or not owned", body = Object, example = json!({
            "message": "Presensi tidak ditemukan"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn update_presensi(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let presensi_id = path.into_inner();
    let payload = payload.into_inner();

    let update = db_utils::build_owned_update(
        "presensi",
        UPDATABLE_COLUMNS,
        &payload,
        presensi_id,
        auth.user_id,
    )?;

    // setting check_out back to NULL re-opens the record, and the open
    // session unique key can fire just like on check-in
    let affected = db_utils::execute_update(pool.get_ref(), update)
        .await
        .map_err(map_presensi_write_err)?;

    if affected == 0 {
        return Err(ApiError::NotFound("Presensi tidak ditemukan".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Presensi berhasil diupdate"
    })))
}

/// Owner-scoped delete of a record
#[utoipa::path(
    delete,
    path = "/api/presensi/{id}",
    params(
        ("id" = u64, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = Object, example = json!({
            "message": "Presensi berhasil dihapus"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found or not owned"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn delete_presensi(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let presensi_id = path.into_inner();

    let result = sqlx::query("DELETE FROM presensi WHERE id = ? AND user_id = ?")
        .bind(presensi_id)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Presensi tidak ditemukan".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Presensi berhasil dihapus"
    })))
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct PresensiWithUser {
    pub id: u64,
    pub user_id: u64,
    pub nama: String,
    pub email: String,
    pub role: String,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    pub bukti_foto: Option<String>,
}

/// All records with their user, newest first (admin dashboard)
#[utoipa::path(
    get,
    path = "/api/presensi",
    responses(
        (status = 200, description = "All attendance records", body = Object, example = json!({
            "message": "Data presensi ditemukan",
            "data": []
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn list_presensi(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let data = sqlx::query_as::<_, PresensiWithUser>(
        r#"
        SELECT p.id, p.user_id, u.nama, u.email, u.role,
               p.check_in, p.check_out, p.latitude, p.longitude, p.bukti_foto
        FROM presensi p
        JOIN users u ON u.id = p.user_id
        ORDER BY p.check_in DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Data presensi ditemukan",
        "data": data
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;

    #[test]
    fn round7_matches_stored_precision() {
        assert_eq!(round7(-7.80681749999), -7.8068175);
        assert_eq!(round7(110.327136), 110.327136);
        assert_eq!(round7(0.0), 0.0);
    }

    #[derive(Debug)]
    struct FakeDbError {
        code: Option<&'static str>,
        unique: bool,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake database error")
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }
    }

    fn duplicate_key_error() -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError {
            code: Some("23000"),
            unique: true,
        }))
    }

    #[test]
    fn duplicate_key_on_write_maps_to_duplicate_session() {
        // covers re-opening a record via PUT {"check_out": null} while
        // another session is already open
        assert!(matches!(
            map_presensi_write_err(duplicate_key_error()),
            ApiError::DuplicateSession
        ));
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let err = sqlx::Error::Database(Box::new(FakeDbError {
            code: Some("42S02"),
            unique: false,
        }));
        assert!(matches!(map_presensi_write_err(err), ApiError::Internal));

        assert!(matches!(
            map_presensi_write_err(sqlx::Error::RowNotFound),
            ApiError::Internal
        ));
    }
}
