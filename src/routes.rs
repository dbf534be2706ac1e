use crate::{
    api::{presensi, report},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Per-route limiter config. A zero rate would make the builder fail, so it
// is clamped to one request per minute.
fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    GovernorConfigBuilder::default()
        .per_millisecond(60_000 / requests_per_min as u64)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap()
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = build_limiter(config.rate_login_per_min);
    let register_limiter = build_limiter(config.rate_register_per_min);
    let refresh_limiter = build_limiter(config.rate_refresh_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_limiter))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_limiter))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(
                web::scope("/presensi")
                    // /presensi (admin listing)
                    .service(web::resource("").route(web::get().to(presensi::list_presensi)))
                    // /presensi/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(presensi::check_in)),
                    )
                    // /presensi/check-out
                    .service(
                        web::resource("/check-out").route(web::post().to(presensi::check_out)),
                    )
                    // /presensi/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(presensi::update_presensi))
                            .route(web::delete().to(presensi::delete_presensi)),
                    ),
            )
            .service(
                web::scope("/reports").service(
                    web::resource("/daily").route(web::get().to(report::get_daily_report)),
                ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_tolerates_zero_rate() {
        // clamped to 1/min instead of panicking at startup
        build_limiter(0);
        build_limiter(1);
        build_limiter(60);
    }
}
