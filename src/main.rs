use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod export;
mod model;
mod query;
mod routes;
mod state;
mod store;

use config::Config;
use db::init_db;

use crate::auth::session::SessionStore;
use crate::docs::ApiDoc;
use crate::query::QueryBuilder;
use crate::routes::RateLimits;
use crate::state::AppState;
use crate::store::mysql::MySqlStore;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let policy = config.access_policy();
    if policy.allowed_count() == 0 {
        warn!("ALLOWED_EMPLOYEE_IDS is empty; every data request will be denied");
    }
    info!(
        allowed = policy.allowed_count(),
        require_directory = policy.requires_directory(),
        tz_offset = %config.tz_offset,
        strict_dates = config.strict_date_params,
        "Access and reporting settings loaded"
    );

    let pool = init_db(&config.database_url, &config.database_name).await?;
    let store = Arc::new(MySqlStore::new(pool));

    let state = Data::new(AppState {
        store: store.clone(),
        directory: store,
        policy,
        sessions: SessionStore::new(config.session_ttl),
        builder: QueryBuilder::new(config.tz_offset, config.strict_date_params),
        export_prefix: config.export_prefix.clone(),
    });

    let limits = RateLimits {
        login_per_min: config.rate_login_per_min,
        api_per_min: config.rate_api_per_min,
    };
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .configure(|cfg| routes::configure(cfg, limits))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
