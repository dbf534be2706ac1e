use crate::api::presensi::{PresensiReq, PresensiSummary, PresensiWithUser};
use crate::api::report::{ReportEntry, ReportFilter, ReportResponse};
use crate::model::presensi::Presensi;
use crate::model::role::Role;
use crate::models::{LoginReqDto, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presensi API",
        version = "1.0.0",
        description = r#"
## Presensi (Attendance) System

This API powers a geofenced student/staff attendance system.

### 🔹 Key Features
- **Check-In / Check-Out**
  - GPS coordinate validated against the campus geofence (50 m radius by default)
  - Webcam photo required as evidence at check-in
  - At most one open session per user, enforced by the database
- **Daily Report**
  - Admin-only, filtered by name and check-in date range, oldest first
- **Record Maintenance**
  - Owner-scoped update and delete of attendance records

### 🔐 Security
Endpoints under the API prefix are protected using **JWT Bearer authentication**.
The daily report and the full listing require the **admin** role.

### 📦 Response Format
- JSON-based RESTful responses
- Timestamps rendered in WIB (UTC+7)

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::presensi::check_in,
        crate::api::presensi::check_out,
        crate::api::presensi::update_presensi,
        crate::api::presensi::delete_presensi,
        crate::api::presensi::list_presensi,

        crate::api::report::get_daily_report
    ),
    components(
        schemas(
            PresensiReq,
            PresensiSummary,
            PresensiWithUser,
            Presensi,
            ReportFilter,
            ReportEntry,
            ReportResponse,
            RegisterReq,
            LoginReqDto,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Presensi", description = "Check-in/check-out and record maintenance APIs"),
        (name = "Report", description = "Attendance report APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
