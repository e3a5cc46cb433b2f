//! Serves uploaded attachments.
//!
//! ```text
//! GET /api/v1/files/{name}
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

use crate::domain::Error;
use crate::domain::ports::ObjectRef;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Content type for a stored object, chosen by extension.
fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Download a stored attachment.
#[utoipa::path(
    get,
    path = "/api/v1/files/{name}",
    params(("name" = String, Path, description = "Stored object name")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "Name not allowed", body = Error),
        (status = 404, description = "No such file", body = Error)
    ),
    tags = ["files"],
    operation_id = "downloadFile",
    security([])
)]
#[get("/files/{name}")]
pub async fn download(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let reference = ObjectRef::new(path.into_inner());
    let Some(bytes) = state.objects.load(&reference).await? else {
        return Err(Error::not_found(format!(
            "file `{}` not found",
            reference.name()
        )));
    };
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type_for(reference.name())))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400, immutable"))
        .body(bytes))
}
