//! Sign-in handlers for candidates and the administrator.
//!
//! ```text
//! POST /api/v1/login {"email":"jdoe@example.com"}
//! POST /api/v1/login/{candidate_id}/password {"password":"..."}
//! POST /api/v1/register/{candidate_id} {"password":"...","confirmation":"..."}
//! POST /api/v1/logout
//! POST /api/v1/admin/login {"username":"admin","password":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::domain::ports::CandidateLogin;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_candidate_id, require_non_empty};

/// Request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmailLoginRequest {
    #[schema(example = "jdoe@example.com")]
    pub email: String,
}

/// Request body for `POST /api/v1/login/{candidate_id}/password`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PasswordRequest {
    pub password: String,
}

/// Request body for `POST /api/v1/register/{candidate_id}`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub password: String,
    pub confirmation: String,
}

/// Request body for `POST /api/v1/admin/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

/// Look a candidate up by email and report the next sign-in step.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = EmailLoginRequest,
    responses(
        (status = 200, description = "Next step", body = CandidateLogin),
        (status = 400, description = "Missing email", body = Error),
        (status = 404, description = "Unknown email", body = Error)
    ),
    tags = ["login"],
    operation_id = "beginLogin",
    security([])
)]
#[post("/login")]
pub async fn begin_login(
    state: web::Data<HttpState>,
    payload: web::Json<EmailLoginRequest>,
) -> ApiResult<web::Json<CandidateLogin>> {
    let next = state.login.begin_candidate_login(&payload.email).await?;
    Ok(web::Json(next))
}

/// Check a candidate's password and start their session.
#[utoipa::path(
    post,
    path = "/api/v1/login/{candidate_id}/password",
    params(("candidate_id" = String, Path, description = "Roster user id")),
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Signed in", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Wrong password or no password set", body = Error),
        (status = 404, description = "Unknown candidate", body = Error)
    ),
    tags = ["login"],
    operation_id = "passwordLogin",
    security([])
)]
#[post("/login/{candidate_id}/password")]
pub async fn password_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    let candidate = parse_candidate_id(&path)?;
    state
        .login
        .verify_password(&candidate, &payload.password)
        .await?;
    session.persist_candidate(&candidate)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Choose a first password and start the candidate's session.
#[utoipa::path(
    post,
    path = "/api/v1/register/{candidate_id}",
    params(("candidate_id" = String, Path, description = "Roster user id")),
    request_body = RegisterRequest,
    responses(
        (status = 204, description = "Registered and signed in", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Password rejected", body = Error),
        (status = 404, description = "Unknown candidate", body = Error),
        (status = 409, description = "Password already set", body = Error)
    ),
    tags = ["login"],
    operation_id = "register",
    security([])
)]
#[post("/register/{candidate_id}")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let candidate = parse_candidate_id(&path)?;
    state
        .login
        .register_password(&candidate, &payload.password, &payload.confirmation)
        .await?;
    session.persist_candidate(&candidate)?;
    Ok(HttpResponse::NoContent().finish())
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["login"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Check the administrator credentials and start an admin session.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 204, description = "Signed in", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing field", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AdminLoginRequest>,
) -> ApiResult<HttpResponse> {
    let username = require_non_empty("username", &payload.username)?;
    require_non_empty("password", &payload.password)?;
    state
        .login
        .authenticate_admin(username, &payload.password)
        .await?;
    session.persist_admin()?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, get, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::CandidateId;
    use crate::inbound::http::test_utils::{
        MockPorts, SESSION_COOKIE, session_cookie, test_session_middleware,
    };

    /// Reports who the session belongs to so tests can observe login effects.
    #[get("/whoami")]
    async fn whoami(session: SessionContext) -> ApiResult<HttpResponse> {
        Ok(HttpResponse::Ok().json(json!({
            "admin": session.is_admin()?,
            "candidate": session.candidate_id()?.map(String::from),
        })))
    }

    fn test_app(
        ports: MockPorts,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .app_data(web::Data::new(ports.into_state()))
            .service(whoami)
            .service(
                web::scope("/api/v1")
                    .service(begin_login)
                    .service(password_login)
                    .service(register)
                    .service(logout)
                    .service(admin_login),
            )
    }

    fn jdoe() -> CandidateId {
        CandidateId::new("jdoe").expect("fixture id")
    }

    async fn whoami_with<S, B>(app: &S, cookie: actix_web::cookie::Cookie<'static>) -> Value
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse<B>,
                Error = actix_web::Error,
            >,
        B: actix_web::body::MessageBody,
    {
        let request = actix_test::TestRequest::get()
            .uri("/whoami")
            .cookie(cookie)
            .to_request();
        actix_test::call_and_read_body_json(app, request).await
    }

    #[rstest]
    #[case(CandidateLogin::Password { candidate_id: jdoe() }, "password")]
    #[case(CandidateLogin::Register { candidate_id: jdoe() }, "register")]
    #[actix_web::test]
    async fn email_login_reports_next_step(#[case] next: CandidateLogin, #[case] tag: &str) {
        let mut ports = MockPorts::default();
        ports
            .login
            .expect_begin_candidate_login()
            .withf(|email| email == "JDoe@Example.com")
            .return_once(move |_| Ok(next));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": "JDoe@Example.com" }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["next"], json!(tag));
        assert_eq!(body["candidateId"], json!("jdoe"));
    }

    #[rstest]
    #[actix_web::test]
    async fn password_login_starts_candidate_session() {
        let mut ports = MockPorts::default();
        ports
            .login
            .expect_verify_password()
            .withf(|id, password| id.to_string() == "jdoe" && password == "hunter22")
            .return_once(|_, _| Ok(()));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/login/jdoe/password")
            .set_json(json!({ "password": "hunter22" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let body = whoami_with(&app, session_cookie(&response)).await;
        assert_eq!(body["candidate"], json!("jdoe"));
        assert_eq!(body["admin"], json!(false));
    }

    #[rstest]
    #[actix_web::test]
    async fn wrong_password_sets_no_session() {
        let mut ports = MockPorts::default();
        ports
            .login
            .expect_verify_password()
            .return_once(|_, _| Err(Error::unauthorized("invalid credentials")));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/login/jdoe/password")
            .set_json(json!({ "password": "nope" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(
            response
                .response()
                .cookies()
                .all(|cookie| cookie.name() != SESSION_COOKIE)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn registration_passes_both_passwords_and_signs_in() {
        let mut ports = MockPorts::default();
        ports
            .login
            .expect_register_password()
            .withf(|id, password, confirmation| {
                id.to_string() == "jdoe" && password == "hunter22" && confirmation == "hunter22"
            })
            .return_once(|_, _, _| Ok(()));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/register/jdoe")
            .set_json(json!({ "password": "hunter22", "confirmation": "hunter22" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let body = whoami_with(&app, session_cookie(&response)).await;
        assert_eq!(body["candidate"], json!("jdoe"));
    }

    #[rstest]
    #[actix_web::test]
    async fn admin_login_then_logout() {
        let mut ports = MockPorts::default();
        ports
            .login
            .expect_authenticate_admin()
            .withf(|username, password| username == "admin" && password == "s3cret")
            .return_once(|_, _| Ok(()));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/login")
            .set_json(json!({ "username": " admin ", "password": "s3cret" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookie = session_cookie(&response);
        assert_eq!(whoami_with(&app, cookie.clone()).await["admin"], json!(true));

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cleared = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .expect("session removal cookie");
        assert_eq!(cleared.value(), "");
    }

    #[rstest]
    #[case(json!({ "username": "", "password": "x" }), "username")]
    #[case(json!({ "username": "admin", "password": "  " }), "password")]
    #[actix_web::test]
    async fn admin_login_rejects_blank_fields(#[case] body: Value, #[case] field: &str) {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/login")
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], json!(field));
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_candidate_path_is_rejected_before_lookup() {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/register/%20")
            .set_json(json!({ "password": "a", "confirmation": "a" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
