//! Server construction and middleware wiring.

mod config;

pub use config::{BuildMode, ServerConfigError, ServerSettings, load_session_key};

use std::io;
use std::path::Path;
use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
use url::Url;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{ObjectStore, RecordStore};
use crate::domain::{
    AdminCredentials, CandidateAdminService, EventAdminService, PasswordLoginService,
    ScheduleService,
};
use crate::inbound::http::api_routes;
use crate::inbound::http::error::{json_error_handler, query_error_handler};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::{
    FilesystemObjectStore, FilesystemRecordStore, InMemoryObjectStore, InMemoryRecordStore,
    ResilienceConfig, ResilientRecordStore,
};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Largest accepted upload or roster body.
const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Driven adapters selected at startup.
#[derive(Clone)]
pub struct Stores {
    pub records: Arc<dyn RecordStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl Stores {
    /// Filesystem stores under `data_dir`, or in-memory stores when absent.
    ///
    /// The record store is always wrapped with timeouts and retries.
    pub fn open(
        data_dir: Option<&Path>,
        base_url: Url,
        resilience: ResilienceConfig,
    ) -> io::Result<Self> {
        let (records, objects): (Arc<dyn RecordStore>, Arc<dyn ObjectStore>) = match data_dir {
            Some(dir) => {
                info!(path = %dir.display(), "using filesystem stores");
                (
                    Arc::new(FilesystemRecordStore::open(dir)?),
                    Arc::new(FilesystemObjectStore::open(dir, base_url)?),
                )
            }
            None => {
                info!("no data directory configured; using in-memory stores");
                (
                    Arc::new(InMemoryRecordStore::new()),
                    Arc::new(InMemoryObjectStore::new(base_url)),
                )
            }
        };
        Ok(Self {
            records: Arc::new(ResilientRecordStore::new(records, resilience)),
            objects,
        })
    }
}

/// Build handler state from the selected stores.
pub fn build_http_state(stores: &Stores, admin: AdminCredentials) -> HttpState {
    let Stores { records, objects } = stores.clone();
    HttpState {
        schedule: Arc::new(ScheduleService::new(records.clone())),
        events: Arc::new(EventAdminService::new(records.clone(), objects.clone())),
        candidates: Arc::new(CandidateAdminService::new(records.clone())),
        login: Arc::new(PasswordLoginService::new(records, admin)),
        objects,
    }
}

/// Session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Everything one App instance needs.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub session: SessionSettings,
}

/// Assemble the application: JSON API under `/api/v1`, probes at the root,
/// and Swagger UI in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), session.key)
        .cookie_name(SESSION_COOKIE.into())
        .cookie_path("/".into())
        .cookie_secure(session.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(session.same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(12)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
        .configure(api_routes);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind and start the server, marking it ready once listening.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    session: SessionSettings,
    bind_addr: std::net::SocketAddr,
) -> io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(http_state);
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::TRACE_ID_HEADER;

    fn deps() -> AppDependencies {
        let base = Url::parse("http://localhost:8080/").expect("base url");
        let stores = Stores::open(None, base, ResilienceConfig::default()).expect("memory stores");
        let health = HealthState::new(stores.records.clone());
        health.mark_ready();
        AppDependencies {
            health_state: web::Data::new(health),
            http_state: web::Data::new(build_http_state(
                &stores,
                AdminCredentials::new("admin", "s3cret"),
            )),
            session: SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            },
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn probes_and_trace_header_are_wired() {
        let app = test::init_service(build_app(deps())).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(TRACE_ID_HEADER));
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_json_uses_error_schema() {
        let app = test::init_service(build_app(deps())).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], json!("invalid_request"));
        assert_eq!(body["details"]["code"], json!("invalid_body"));
    }

    #[rstest]
    #[actix_web::test]
    async fn unconfigured_weekend_is_not_found() {
        let app = test::init_service(build_app(deps())).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/v1/schedule").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
