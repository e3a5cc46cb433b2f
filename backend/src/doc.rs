//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint and the session cookie security
//! scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    CandidateLogin, EventDetails, EventView, RosterImportSummary, UploadedAttachment,
};
use crate::domain::{
    CandidateDetails, CandidateDraft, CandidateProfile, Error, ErrorCode, EventDraft, Schedule,
    ScheduleWarning, ScheduledEvent,
};
use crate::inbound::http::admin_events::WeekendSetting;
use crate::inbound::http::login::{
    AdminLoginRequest, EmailLoginRequest, PasswordRequest, RegisterRequest,
};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the candidate and administrator login endpoints.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Candidates' Weekend API",
        description = "Weekend schedules, event administration and candidate rosters.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::schedule::current_schedule,
        crate::inbound::http::schedule::candidate_schedule,
        crate::inbound::http::schedule::event_details,
        crate::inbound::http::schedule::candidate_profile,
        crate::inbound::http::login::begin_login,
        crate::inbound::http::login::password_login,
        crate::inbound::http::login::register,
        crate::inbound::http::login::logout,
        crate::inbound::http::login::admin_login,
        crate::inbound::http::admin_events::get_weekend,
        crate::inbound::http::admin_events::set_weekend,
        crate::inbound::http::admin_events::list_events,
        crate::inbound::http::admin_events::create_event,
        crate::inbound::http::admin_events::get_event,
        crate::inbound::http::admin_events::update_event,
        crate::inbound::http::admin_events::delete_event,
        crate::inbound::http::admin_events::duplicate_event,
        crate::inbound::http::admin_events::upload_attachment,
        crate::inbound::http::admin_events::preview_schedule,
        crate::inbound::http::admin_candidates::list_candidates,
        crate::inbound::http::admin_candidates::import_roster,
        crate::inbound::http::admin_candidates::get_candidate,
        crate::inbound::http::admin_candidates::update_candidate,
        crate::inbound::http::admin_candidates::delete_candidate,
        crate::inbound::http::files::download,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Schedule,
        ScheduledEvent,
        ScheduleWarning,
        EventDetails,
        EventView,
        EventDraft,
        UploadedAttachment,
        CandidateProfile,
        CandidateDetails,
        CandidateDraft,
        CandidateLogin,
        RosterImportSummary,
        WeekendSetting,
        EmailLoginRequest,
        PasswordRequest,
        RegisterRequest,
        AdminLoginRequest,
    )),
    tags(
        (name = "schedule", description = "Weekend schedules and event details"),
        (name = "candidates", description = "Candidate info cards"),
        (name = "login", description = "Candidate sign-in and registration"),
        (name = "admin", description = "Event, weekend and roster administration"),
        (name = "files", description = "Uploaded attachments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        let schema = schemas
            .into_iter()
            .find(|(key, _)| key == name || key.ends_with(&format!(".{name}")))
            .map(|(_, schema)| schema)
            .unwrap_or_else(|| panic!("schema {name} registered"));
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("Error", "traceId")]
    #[case("ScheduledEvent", "startTime")]
    #[case("EventDetails", "descriptionLines")]
    #[case("EventView", "linksText")]
    fn schemas_use_camel_case_fields(#[case] schema: &str, #[case] field: &str) {
        assert!(schema_fields(schema).iter().any(|name| name == field));
    }

    #[rstest]
    #[case("/api/v1/schedule")]
    #[case("/api/v1/admin/events/{event_key}/duplicate")]
    #[case("/api/v1/admin/candidates/{candidate_id}")]
    #[case("/api/v1/files/{name}")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }
}
