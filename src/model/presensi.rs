use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One attendance session. `check_out` stays NULL while the session is open;
/// the store allows at most one open row per user.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Presensi {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2026-01-05T01:30:00Z", format = "date-time", value_type = String)]
    pub check_in: DateTime<Utc>,

    #[schema(example = "2026-01-05T09:30:00Z", format = "date-time", value_type = String, nullable = true)]
    pub check_out: Option<DateTime<Utc>>,

    #[schema(example = -7.8068)]
    pub latitude: f64,

    #[schema(example = 110.3271)]
    pub longitude: f64,

    #[schema(example = "d3b07384-d9a0-4c9f-8f2e-1b2a3c4d5e6f.jpg", nullable = true)]
    pub bukti_foto: Option<String>,
}
