use crate::{
    api::{presence, upload},
    config::Config,
    error::PresenceError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpRequest, error::QueryPayloadError, web};
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    upload: Arc<Limiter>,
    query: Arc<Limiter>,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            upload: Arc::new(build_limiter(config.rate_upload_per_min)?),
            query: Arc::new(build_limiter(config.rate_query_per_min)?),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
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
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} per minute"))?;
    Ok(Governor::new(&cfg))
}

/// Malformed `sort`/`order` values get the same JSON error body as everything else.
fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    PresenceError::Validation(err.to_string()).into()
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiters: Limiters) {
    cfg.service(
        web::scope(api_prefix)
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .service(presence::health)
            .service(
                web::scope("/upload")
                    // /upload/employees
                    .service(
                        web::resource("/employees")
                            .wrap(limiters.upload.clone())
                            .route(web::post().to(upload::upload_employees)),
                    )
                    // /upload/card-login
                    .service(
                        web::resource("/card-login")
                            .wrap(limiters.upload.clone())
                            .route(web::post().to(upload::upload_card_login)),
                    )
                    // /upload/official-leaves
                    .service(
                        web::resource("/official-leaves")
                            .wrap(limiters.upload.clone())
                            .route(web::post().to(upload::upload_official_leaves)),
                    ),
            )
            .service(
                web::resource("/calculate")
                    .wrap(limiters.query.clone())
                    .route(web::get().to(presence::calculate)),
            )
            .service(
                web::resource("/directorates")
                    .wrap(limiters.query.clone())
                    .route(web::get().to(presence::directorates)),
            )
            .service(
                web::resource("/sources")
                    .wrap(limiters.query)
                    .route(web::get().to(presence::sources)),
            ),
    );
}

// UPLOAD (one source per call, any order)
//  ├─ /upload/employees        -> directory
//  ├─ /upload/card-login       -> access log
//  └─ /upload/official-leaves  -> leave log

// QUERY (same cached snapshot until the next upload)
//  ├─ /health
//  ├─ /calculate?sort=&order=
//  ├─ /directorates
//  └─ /sources
