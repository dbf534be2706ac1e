use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::models::Claims;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, Validation, decode};

#[derive(Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub nama: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => {
                return ready(Err(
                    ApiError::Unauthorized("Token tidak ditemukan".to_string()).into()
                ));
            }
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => {
                return ready(Err(
                    ApiError::Unauthorized("Token tidak valid".to_string()).into()
                ));
            }
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            email: data.claims.sub,
            nama: data.claims.nama,
            role: data.claims.role,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Akses khusus admin".to_string()))
        }
    }
}
