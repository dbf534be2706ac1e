use crate::geo::{Geofence, GeoPoint};
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Geofence: reference point and allowed radius for check-in/check-out
    pub campus_lat: f64,
    pub campus_lng: f64,
    pub geofence_radius_m: f64,

    // Whether check-out must also carry a photo (check-in always does)
    pub checkout_requires_photo: bool,

    pub upload_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            campus_lat: env::var("CAMPUS_LAT")
                .unwrap_or_else(|_| "-7.806817".to_string())
                .parse()
                .unwrap(),
            campus_lng: env::var("CAMPUS_LNG")
                .unwrap_or_else(|_| "110.327136".to_string())
                .parse()
                .unwrap(),
            geofence_radius_m: env::var("GEOFENCE_RADIUS_M")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap(),

            checkout_requires_photo: env::var("CHECKOUT_REQUIRES_PHOTO")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap(),

            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
        }
    }

    pub fn geofence(&self) -> Geofence {
        Geofence {
            center: GeoPoint {
                lat: self.campus_lat,
                lng: self.campus_lng,
            },
            radius_m: self.geofence_radius_m,
        }
    }
}
