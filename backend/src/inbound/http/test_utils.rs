//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};

use crate::domain::ports::{
    MockCandidateAdminCommand, MockEventAdminCommand, MockLoginService, MockObjectStore,
    MockScheduleQuery,
};
use crate::domain::{CandidateId, Error};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Cookie name used by [`test_session_middleware`].
pub const SESSION_COOKIE: &str = "session";

/// Build a session middleware configured for tests.
///
/// Uses a fresh key per invocation and disables the `Secure` flag so cookies
/// flow over plain HTTP in tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .expect("session cookie set")
        .into_owned()
}

/// Mocked driving ports; set expectations, then call [`MockPorts::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub schedule: MockScheduleQuery,
    pub events: MockEventAdminCommand,
    pub candidates: MockCandidateAdminCommand,
    pub login: MockLoginService,
    pub objects: MockObjectStore,
}

impl MockPorts {
    /// Wrap the mocks in handler state.
    pub fn into_state(self) -> HttpState {
        HttpState {
            schedule: Arc::new(self.schedule),
            events: Arc::new(self.events),
            candidates: Arc::new(self.candidates),
            login: Arc::new(self.login),
            objects: Arc::new(self.objects),
        }
    }
}

/// Who a test request should be signed in as.
#[derive(Debug, Clone, Copy)]
pub enum SignedIn<'a> {
    Admin,
    Candidate(&'a str),
}

/// Register routes that establish sessions without going through login.
pub fn session_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/test-session/admin",
        web::get().to(|session: SessionContext| async move {
            session.persist_admin()?;
            Ok::<_, Error>(HttpResponse::Ok())
        }),
    )
    .route(
        "/test-session/candidate/{id}",
        web::get().to(
            |session: SessionContext, path: web::Path<String>| async move {
                let id = CandidateId::new(path.as_str()).expect("fixture candidate id");
                session.persist_candidate(&id)?;
                Ok::<_, Error>(HttpResponse::Ok())
            },
        ),
    );
}

/// Obtain a session cookie from an app configured with [`session_routes`].
pub async fn sign_in<S, B>(app: &S, who: SignedIn<'_>) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let uri = match who {
        SignedIn::Admin => "/test-session/admin".to_owned(),
        SignedIn::Candidate(id) => format!("/test-session/candidate/{id}"),
    };
    let response = test::call_service(app, test::TestRequest::get().uri(&uri).to_request()).await;
    session_cookie(&response)
}
