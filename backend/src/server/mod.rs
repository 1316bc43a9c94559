//! HTTP server for the ledger API.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite, time::Duration};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use state_builders::build_http_state;
#[cfg(debug_assertions)]
use tabsplit_backend::ApiDoc;
use tabsplit_backend::Trace;
use tabsplit_backend::inbound::http::configure_api;
use tabsplit_backend::inbound::http::health::{HealthState, live, ready};
use tabsplit_backend::inbound::http::validation::json_config;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_COOKIE: &str = "session";
const SESSION_TTL_HOURS: i64 = 2;

/// Private, HTTP-only session cookie guarding `/api/v1`.
fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}

/// Ledger API under the session cookie, health checks at the root, and the
/// Swagger UI in debug builds.
fn routes(cfg: &mut web::ServiceConfig, session: SessionMiddleware<CookieSessionStore>) {
    cfg.service(web::scope("/api/v1").wrap(session).configure(configure_api))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    cfg.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
}

/// Bind the HTTP server and mark the service ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(config.db_pool.as_ref()));
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let worker_health = health_state.clone();
    let server = HttpServer::new(move || {
        let session = session_middleware(key.clone(), cookie_secure, same_site);
        App::new()
            .app_data(worker_health.clone())
            .app_data(http_state.clone())
            .app_data(json_config())
            .wrap(Trace)
            .configure(|cfg| routes(cfg, session))
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
