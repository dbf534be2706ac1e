use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::utils::wib;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ReportFilter {
    /// Name substring, case-insensitive
    #[param(example = "Budi")]
    pub nama: Option<String>,
    /// Range start (WIB calendar date); only applied together with tanggalSelesai
    #[serde(rename = "tanggalMulai")]
    #[param(example = "2026-01-01", format = "date", value_type = String)]
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub tanggal_mulai: Option<NaiveDate>,
    /// Range end (WIB calendar date)
    #[serde(rename = "tanggalSelesai")]
    #[param(example = "2026-01-31", format = "date", value_type = String)]
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub tanggal_selesai: Option<NaiveDate>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
    DateTime(DateTime<Utc>),
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: u64,
    user_id: u64,
    nama: String,
    check_in: DateTime<Utc>,
    check_out: Option<DateTime<Utc>>,
    latitude: f64,
    longitude: f64,
    bukti_foto: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportEntry {
    #[schema(example = 1)]
    pub id: u64,
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

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    #[schema(example = "Laporan presensi berhasil diambil.")]
    pub message: String,
    #[schema(example = 1)]
    pub total: usize,
    pub data: Vec<ReportEntry>,
}

/// Daily attendance report, admin only
#[utoipa::path(
    get,
    path = "/api/reports/daily",
    params(ReportFilter),
    responses(
        (status = 200, description = "Matching records, check-in ascending", body = ReportResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn get_daily_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportFilter>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(nama) = query.nama.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        // LIKE under the default *_ci collation, so case-insensitive
        where_sql.push_str(" AND u.nama LIKE ?");
        args.push(FilterValue::Str(format!("%{}%", nama)));
    }

    if let (Some(mulai), Some(selesai)) = (query.tanggal_mulai, query.tanggal_selesai) {
        let (start, end) = wib::day_bounds_utc(mulai, selesai);
        where_sql.push_str(" AND p.check_in BETWEEN ? AND ?");
        args.push(FilterValue::DateTime(start));
        args.push(FilterValue::DateTime(end));
    }

    let data_sql = format!(
        r#"
        SELECT p.id, p.user_id, u.nama, p.check_in, p.check_out,
               p.latitude, p.longitude, p.bukti_foto
        FROM presensi p
        JOIN users u ON u.id = p.user_id
        {}
        ORDER BY p.check_in ASC
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, ReportRow>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::DateTime(t) => data_q.bind(t),
        };
    }

    let rows = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch daily report");
        ApiError::Internal
    })?;

    let data: Vec<ReportEntry> = rows
        .into_iter()
        .map(|r| ReportEntry {
            id: r.id,
            user_id: r.user_id,
            nama: r.nama,
            check_in: wib::format_timestamp(r.check_in),
            check_out: r.check_out.map(wib::format_timestamp),
            latitude: r.latitude,
            longitude: r.longitude,
            bukti_foto: r.bukti_foto,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ReportResponse {
        message: "Laporan presensi berhasil diambil.".to_string(),
        total: data.len(),
        data,
    }))
}
