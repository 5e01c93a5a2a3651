use crate::{
    api::{attendance, dashboard},
    auth::handlers,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub login_per_min: u32,
    pub api_per_min: u32,
}

pub fn configure(cfg: &mut web::ServiceConfig, limits: RateLimits) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms.max(1))
            .burst_size(requests_per_min.max(1))
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("per_millisecond and burst_size are non-zero");
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(limits.login_per_min));
    let api_limiter = Arc::new(build_limiter(limits.api_per_min));

    // Dashboard
    cfg.service(dashboard::index);

    // Session routes
    cfg.service(
        web::resource("/login")
            .wrap(login_limiter.clone())
            .route(web::get().to(handlers::login)),
    )
    .service(
        web::resource("/logout")
            .wrap(login_limiter)
            .route(web::get().to(handlers::logout)),
    );

    // Attendance data; access is checked per request by the authorization gate
    cfg.service(
        web::scope("/api")
            .wrap(api_limiter)
            .service(
                web::resource("/attendances").route(web::get().to(attendance::list_attendances)),
            )
            .service(
                web::resource("/export-excel").route(web::get().to(attendance::export_excel)),
            ),
    );
}
