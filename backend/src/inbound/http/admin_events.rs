//! Administrator handlers for events, the current weekend and attachments.
//!
//! ```text
//! GET  /api/v1/admin/weekend
//! PUT  /api/v1/admin/weekend {"weekend":"3"}
//! GET  /api/v1/admin/events
//! POST /api/v1/admin/events {EventDraft}
//! GET|PUT|DELETE /api/v1/admin/events/{event_key}
//! POST /api/v1/admin/events/{event_key}/duplicate
//! POST /api/v1/admin/uploads?filename=map.png <bytes>
//! GET  /api/v1/admin/schedule
//! ```
//!
//! Every handler requires the administrator session.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{EventView, UploadedAttachment};
use crate::domain::{Error, EventDraft, Schedule};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_weekend, require_non_empty};

/// Current weekend, as read and written by administrators.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeekendSetting {
    #[schema(example = "3")]
    pub weekend: String,
}

/// Query string for `POST /api/v1/admin/uploads`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Original file name; the extension decides whether it is accepted.
    pub filename: String,
}

/// Weekend anonymous visitors currently see.
#[utoipa::path(
    get,
    path = "/api/v1/admin/weekend",
    responses(
        (status = 200, description = "Current weekend", body = WeekendSetting),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Current weekend not configured", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getCurrentWeekend"
)]
#[get("/admin/weekend")]
pub async fn get_weekend(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<WeekendSetting>> {
    session.require_admin()?;
    let weekend = state.schedule.current_weekend().await?;
    Ok(web::Json(WeekendSetting {
        weekend: weekend.into(),
    }))
}

/// Change the weekend anonymous visitors see.
#[utoipa::path(
    put,
    path = "/api/v1/admin/weekend",
    request_body = WeekendSetting,
    responses(
        (status = 200, description = "Weekend updated", body = WeekendSetting),
        (status = 400, description = "Invalid weekend", body = Error),
        (status = 401, description = "Administrator login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "setCurrentWeekend"
)]
#[put("/admin/weekend")]
pub async fn set_weekend(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<WeekendSetting>,
) -> ApiResult<web::Json<WeekendSetting>> {
    session.require_admin()?;
    let weekend = parse_weekend("weekend", &payload.weekend)?;
    state.events.set_current_weekend(weekend.clone()).await?;
    Ok(web::Json(WeekendSetting {
        weekend: weekend.into(),
    }))
}

/// Every stored event.
#[utoipa::path(
    get,
    path = "/api/v1/admin/events",
    responses(
        (status = 200, description = "Events ordered by key", body = [EventView]),
        (status = 401, description = "Administrator login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listEvents"
)]
#[get("/admin/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<EventView>>> {
    session.require_admin()?;
    Ok(web::Json(state.events.list_events().await?))
}

/// Create an event.
#[utoipa::path(
    post,
    path = "/api/v1/admin/events",
    request_body = EventDraft,
    responses(
        (status = 201, description = "Event created", body = EventView),
        (status = 400, description = "Invalid event", body = Error),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 409, description = "An event with this name already exists", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createEvent"
)]
#[post("/admin/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EventDraft>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let view = state.events.create_event(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(view))
}

/// One event in editable form.
#[utoipa::path(
    get,
    path = "/api/v1/admin/events/{event_key}",
    params(("event_key" = String, Path, description = "Event record key")),
    responses(
        (status = 200, description = "Event", body = EventView),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getEvent"
)]
#[get("/admin/events/{event_key}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventView>> {
    session.require_admin()?;
    Ok(web::Json(state.events.edit_view(&path).await?))
}

/// Replace an event; a new name or weekend moves it to a new key.
#[utoipa::path(
    put,
    path = "/api/v1/admin/events/{event_key}",
    params(("event_key" = String, Path, description = "Event record key")),
    request_body = EventDraft,
    responses(
        (status = 200, description = "Event updated", body = EventView),
        (status = 400, description = "Invalid event", body = Error),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Unknown event", body = Error),
        (status = 409, description = "Target key already taken", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateEvent"
)]
#[put("/admin/events/{event_key}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EventDraft>,
) -> ApiResult<web::Json<EventView>> {
    session.require_admin()?;
    let view = state
        .events
        .update_event(&path, payload.into_inner())
        .await?;
    Ok(web::Json(view))
}

/// Remove an event.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/events/{event_key}",
    params(("event_key" = String, Path, description = "Event record key")),
    responses(
        (status = 204, description = "Event removed"),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteEvent"
)]
#[delete("/admin/events/{event_key}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    state.events.delete_event(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Copy an event under a `-copy` key.
#[utoipa::path(
    post,
    path = "/api/v1/admin/events/{event_key}/duplicate",
    params(("event_key" = String, Path, description = "Event record key")),
    responses(
        (status = 201, description = "Copy created", body = EventView),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["admin"],
    operation_id = "duplicateEvent"
)]
#[post("/admin/events/{event_key}/duplicate")]
pub async fn duplicate_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let view = state.events.duplicate_event(&path).await?;
    Ok(HttpResponse::Created().json(view))
}

/// Store an attachment sent as the raw request body.
#[utoipa::path(
    post,
    path = "/api/v1/admin/uploads",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Attachment stored", body = UploadedAttachment),
        (status = 400, description = "Missing or disallowed file name", body = Error),
        (status = 401, description = "Administrator login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "uploadAttachment"
)]
#[post("/admin/uploads")]
pub async fn upload_attachment(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let filename = require_non_empty("filename", &query.filename)?;
    let stored = state
        .events
        .upload_attachment(filename, body.to_vec())
        .await?;
    Ok(HttpResponse::Created().json(stored))
}

/// Current weekend's schedule including data-quality warnings.
#[utoipa::path(
    get,
    path = "/api/v1/admin/schedule",
    responses(
        (status = 200, description = "Schedule with warnings", body = Schedule),
        (status = 401, description = "Administrator login required", body = Error),
        (status = 404, description = "Current weekend not configured", body = Error)
    ),
    tags = ["admin"],
    operation_id = "previewSchedule"
)]
#[get("/admin/schedule")]
pub async fn preview_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Schedule>> {
    session.require_admin()?;
    Ok(web::Json(state.schedule.current_schedule().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{WeekendId, WeekendScope};
    use crate::inbound::http::test_utils::{
        MockPorts, SignedIn, session_routes, sign_in, test_session_middleware,
    };

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
            .configure(session_routes)
            .service(
                web::scope("/api/v1")
                    .service(get_weekend)
                    .service(set_weekend)
                    .service(list_events)
                    .service(create_event)
                    .service(get_event)
                    .service(update_event)
                    .service(delete_event)
                    .service(duplicate_event)
                    .service(upload_attachment)
                    .service(preview_schedule),
            )
    }

    fn view(key: &str) -> EventView {
        EventView {
            key: key.to_owned(),
            name: "Check-In".into(),
            raw_name: "Check-In".into(),
            weekend: "2".into(),
            day: "Friday".into(),
            start_time: "14:00".into(),
            end_time: "15:30".into(),
            location: "Lobby".into(),
            description: String::new(),
            access: "All".into(),
            links: Default::default(),
            links_text: String::new(),
            attachments: Vec::new(),
        }
    }

    fn draft_json() -> Value {
        json!({
            "name": "Check-In",
            "startTime": "14:00",
            "endTime": "15:30",
            "day": "Friday",
            "weekend": "2",
        })
    }

    #[rstest]
    #[case("GET", "/api/v1/admin/weekend")]
    #[case("GET", "/api/v1/admin/events")]
    #[case("GET", "/api/v1/admin/events/Check-In-2")]
    #[case("DELETE", "/api/v1/admin/events/Check-In-2")]
    #[case("POST", "/api/v1/admin/events/Check-In-2/duplicate")]
    #[case("GET", "/api/v1/admin/schedule")]
    #[actix_web::test]
    async fn candidates_cannot_reach_admin_routes(#[case] method: &str, #[case] uri: &str) {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;
        let cookie = sign_in(&app, SignedIn::Candidate("jdoe")).await;

        let request = match method {
            "GET" => actix_test::TestRequest::get(),
            "DELETE" => actix_test::TestRequest::delete(),
            _ => actix_test::TestRequest::post(),
        };
        let response =
            actix_test::call_service(&app, request.uri(uri).cookie(cookie).to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn set_weekend_validates_and_echoes() {
        let mut ports = MockPorts::default();
        ports
            .events
            .expect_set_current_weekend()
            .withf(|weekend| weekend.to_string() == "3")
            .return_once(|_| Ok(()));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, SignedIn::Admin).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/admin/weekend")
            .cookie(cookie.clone())
            .set_json(json!({ "weekend": " 3 " }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, json!({ "weekend": "3" }));

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/admin/weekend")
            .cookie(cookie)
            .set_json(json!({ "weekend": "All" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn get_weekend_reads_current_setting() {
        let mut ports = MockPorts::default();
        ports
            .schedule
            .expect_current_weekend()
            .return_once(|| Ok(WeekendId::new("2").expect("fixture weekend")));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, SignedIn::Admin).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/admin/weekend")
            .cookie(cookie)
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["weekend"], json!("2"));
    }

    #[rstest]
    #[actix_web::test]
    async fn create_event_returns_created_view() {
        let mut ports = MockPorts::default();
        ports
            .events
            .expect_create_event()
            .withf(|draft| {
                draft.name == "Check-In"
                    && draft.weekend == WeekendScope::from(WeekendId::new("2").expect("weekend"))
            })
            .return_once(|_| Ok(view("Check-In-2")));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, SignedIn::Admin).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/events")
            .cookie(cookie)
            .set_json(draft_json())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["key"], json!("Check-In-2"));
        assert_eq!(body["linksText"], json!(""));
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_name_is_conflict() {
        let mut ports = MockPorts::default();
        ports
            .events
            .expect_create_event()
            .return_once(|_| Err(Error::conflict("event `Check-In-2` already exists")));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, SignedIn::Admin).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/events")
            .cookie(cookie)
            .set_json(draft_json())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn update_passes_original_key() {
        let mut ports = MockPorts::default();
        ports
            .events
            .expect_update_event()
            .withf(|key, _| key == "Old Name-2")
            .return_once(|_, _| Ok(view("Check-In-2")));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, SignedIn::Admin).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/admin/events/Old%20Name-2")
            .cookie(cookie)
            .set_json(draft_json())
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["key"], json!("Check-In-2"));
    }

    #[rstest]
    #[actix_web::test]
    async fn delete_and_duplicate_use_path_key() {
        let mut ports = MockPorts::default();
        ports
            .events
            .expect_delete_event()
            .withf(|key| key == "Lunch-2")
            .return_once(|_| Ok(()));
        ports
            .events
            .expect_duplicate_event()
            .withf(|key| key == "Lunch-2")
            .return_once(|_| Ok(view("Lunch-2-copy")));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, SignedIn::Admin).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/events/Lunch-2/duplicate")
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let request = actix_test::TestRequest::delete()
            .uri("/api/v1/admin/events/Lunch-2")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[actix_web::test]
    async fn upload_forwards_raw_body() {
        let mut ports = MockPorts::default();
        ports
            .events
            .expect_upload_attachment()
            .withf(|filename, bytes| filename == "map.png" && bytes.as_slice() == b"PNG")
            .return_once(|filename, _| {
                Ok(UploadedAttachment {
                    name: filename.to_owned(),
                    url: "http://localhost/api/v1/files/abc-map.png".into(),
                })
            });
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, SignedIn::Admin).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/uploads?filename=map.png")
            .cookie(cookie)
            .set_payload("PNG")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["name"], json!("map.png"));
    }

    #[rstest]
    #[actix_web::test]
    async fn upload_requires_filename() {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;
        let cookie = sign_in(&app, SignedIn::Admin).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/uploads?filename=%20")
            .cookie(cookie)
            .set_payload("PNG")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
