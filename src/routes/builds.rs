/// PC build routes
///
/// Plain CRUD over the build store. Unknown ids are 404s; storage failures
/// come back as "Internal server error" with the underlying message.

use actix_web::{error::PathError, web, HttpRequest, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Build, BuildChanges, NewBuild};
use crate::error::{AppError, ErrorContext};
use crate::logger::RequestId;
use crate::store::BuildStore;
use crate::validators::validate_build;

const NOT_FOUND: &str = "Unable to find pc";
const FAILURE: &str = "Internal server error";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub message: &'static str,
    pub deleted_pc: Build,
}

/// Path rejection for `/pcs/{id}`: an id that does not parse names no build.
pub fn invalid_build_id(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidId {
        message: NOT_FOUND,
        detail: err.to_string(),
    }
    .into()
}

/// GET /pcs
pub async fn list_builds(
    builds: web::Data<dyn BuildStore>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("list_builds").with_request_id(request_id);

    let all = builds
        .list()
        .await
        .map_err(|e| context.summarize(e, FAILURE))?;

    Ok(HttpResponse::Ok().json(all))
}

/// GET /pcs/{id}
pub async fn get_build(
    id: web::Path<Uuid>,
    builds: web::Data<dyn BuildStore>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("get_build").with_request_id(request_id);

    let build = builds
        .find_by_id(id.into_inner())
        .await
        .map_err(|e| context.summarize(e, FAILURE))?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(build))
}

/// POST /pcs
///
/// # Errors
/// - 400: `buildName`, `price` or `builder` missing
pub async fn create_build(
    form: web::Json<NewBuild>,
    builds: web::Data<dyn BuildStore>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("create_build").with_request_id(request_id);
    let form = form.into_inner();

    let fields = validate_build(
        form.build_name.as_deref(),
        form.price.as_deref(),
        form.builder.as_deref(),
    )?;

    let build = builds
        .insert(fields.build_name, fields.price, fields.builder)
        .await
        .map_err(|e| context.summarize(e, FAILURE))?;

    tracing::info!(request_id = %context.request_id, build_id = %build.id, "Build created");

    Ok(HttpResponse::Created().json(build))
}

/// PUT /pcs/{id}
///
/// Partial update; fields absent from the body keep their value.
pub async fn update_build(
    id: web::Path<Uuid>,
    form: web::Json<BuildChanges>,
    builds: web::Data<dyn BuildStore>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("update_build").with_request_id(request_id);

    let build = builds
        .update(id.into_inner(), form.into_inner())
        .await
        .map_err(|e| context.summarize(e, FAILURE))?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    tracing::info!(request_id = %context.request_id, build_id = %build.id, "Build updated");

    Ok(HttpResponse::Ok().json(build))
}

/// DELETE /pcs/{id}
pub async fn delete_build(
    id: web::Path<Uuid>,
    builds: web::Data<dyn BuildStore>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("delete_build").with_request_id(request_id);

    let build = builds
        .delete(id.into_inner())
        .await
        .map_err(|e| context.summarize(e, FAILURE))?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    tracing::info!(request_id = %context.request_id, build_id = %build.id, "Build deleted");

    Ok(HttpResponse::Ok().json(DeletedResponse {
        message: "Deleted successfully",
        deleted_pc: build,
    }))
}
