use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::is_duplicate_key,
    model::role::Role,
    models::{LoginReqDto, RegisterReq, TokenType, UserSql},
    utils::email_guard,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::{debug, error, info, instrument};

/// Inserts a new user and keeps the email guard warm
async fn insert_user(
    nama: &str,
    email: &str,
    password: &str,
    role: Role,
    pool: &MySqlPool,
) -> Result<(), HttpResponse> {
    let hashed = hash_password(password);

    let result = sqlx::query(
        r#"INSERT INTO users (nama, email, password, role) VALUES (?, ?, ?, ?)"#,
    )
    .bind(nama)
    .bind(email)
    .bind(hashed)
    .bind(role.as_ref())
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            email_guard::note_registered(email).await;
            Ok(())
        }
        Err(e) => {
            if is_duplicate_key(&e) {
                return Err(HttpResponse::Conflict().json(json!({
                    "message": "Email sudah terdaftar"
                })));
            }

            error!(error = %e, "Failed to insert user");
            Err(HttpResponse::InternalServerError().json(json!({
                "message": "Gagal mendaftarkan pengguna"
            })))
        }
    }
}

/// User registration handler
pub async fn register(user: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let nama = user.nama.trim();
    let email = user.email.trim().to_lowercase();
    let password = &user.password;
    let role = user.role.unwrap_or(Role::Mahasiswa);

    if nama.is_empty() || email.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "message": "Nama, email, dan password wajib diisi"
        }));
    }

    if !email.contains('@') {
        return HttpResponse::BadRequest().json(json!({
            "message": "Format email tidak valid"
        }));
    }

    if !email_guard::is_available(&email, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "message": "Email sudah terdaftar"
        }));
    }

    // The unique key on users.email is still the final authority; the guard
    // only short-circuits the common case.
    match insert_user(nama, &email, password, role, pool.get_ref()).await {
        Ok(_) => HttpResponse::Created().json(json!({
            "message": "Registrasi berhasil"
        })),
        Err(err_resp) => err_resp,
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    nama: String,
    role: Role,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({
            "message": "Email dan password wajib diisi"
        }));
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, nama, email, password, role
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(user.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().json(json!({
                "message": "Email atau password salah"
            }));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({
            "message": "Email atau password salah"
        }));
    }

    let role = match Role::from_str(&db_user.role) {
        Ok(r) => r,
        Err(_) => {
            error!(role = %db_user.role, "Unknown role stored for user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Generating access token");

    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.nama.clone(),
        role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    debug!("Generating refresh token");

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.nama.clone(),
        role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    debug!("Updating last_login_at");

    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        nama: db_user.nama,
        role,
    })
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: u64,
    user_id: u64,
    revoked: i8,
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let record = match sqlx::query_as::<_, RefreshTokenRow>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let record = match record {
        Some(r) if r.revoked == 0 => r,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // revoke old refresh token, then rotate
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE id = ?")
        .bind(record.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.nama.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record.user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.nama.clone(),
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // revoke refresh token (idempotent)
    let _ = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = 1
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await;

    HttpResponse::NoContent().finish()
}
