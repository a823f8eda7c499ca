//! Resource API handlers: listing, upload and download.
//!
//! ```text
//! GET  /api/resources?search=calculus&type=Notes&page=2&limit=10
//! POST /api/resources/upload   (multipart/form-data, Authorization: Bearer <token>)
//! GET  /api/resources/{id}/download
//! ```

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::http::header::{ContentDisposition, ContentType, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, post, web};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use pagination::{MAX_LIMIT, PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::{IntoParams, ToSchema};

use crate::domain::resource_service::{RESOURCE_NOT_FOUND_MESSAGE, map_upload_rejection};
use crate::domain::{
    Error, IncomingFile, MetadataDraft, Resource, ResourceFilter, ResourceId, ResourceMetadata,
    UploadPolicy,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::Authenticated;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::state::HttpState;

/// Message for malformed `page` or `limit` query values.
pub const PAGINATION_MESSAGE: &str = "page and limit must be positive integers";
/// Message for an upload without a `file` part.
pub const FILE_REQUIRED_MESSAGE: &str = "File is required";
/// Message for a body that is not valid multipart form data.
pub const INVALID_MULTIPART_MESSAGE: &str = "Invalid multipart form data";
/// Message returned with a successful upload.
pub const UPLOADED_MESSAGE: &str = "Resource uploaded successfully";

/// Name of the multipart part carrying the document.
pub const FILE_FIELD: &str = "file";
/// Largest accepted text field in an upload form.
const TEXT_FIELD_LIMIT: usize = 64 * 1024;

/// Query parameters for `GET /api/resources`. Empty values are ignored.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Words matched against title, subject and college.
    pub search: Option<String>,
    pub subject: Option<String>,
    pub year: Option<String>,
    pub college: Option<String>,
    /// Exact type label; unknown labels match nothing.
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    /// 1-indexed page number, default 1.
    pub page: Option<String>,
    /// Page size, default 10, capped at 100.
    pub limit: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn positive(value: Option<String>) -> Result<Option<u32>, Error> {
    present(value)
        .map(|raw| raw.trim().parse::<u32>())
        .transpose()
        .map_err(|_| Error::invalid_request(PAGINATION_MESSAGE))
}

impl ListQuery {
    /// Split into a domain filter and a validated page request.
    pub fn into_parts(self) -> Result<(ResourceFilter, PageRequest), Error> {
        let page = positive(self.page)?;
        let limit = positive(self.limit)?.map(|limit| limit.min(MAX_LIMIT));
        let request = PageRequest::from_optional(page, limit)
            .map_err(|_| Error::invalid_request(PAGINATION_MESSAGE))?;
        let filter = ResourceFilter {
            search: present(self.search),
            subject: present(self.subject),
            year: present(self.year),
            college: present(self.college),
            resource_type: present(self.resource_type),
        };
        Ok((filter, request))
    }
}

/// Public view of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    #[schema(example = "5b1f0c2e-8a77-4a43-9c1d-0f5a7f3b2c11")]
    pub id: String,
    pub title: String,
    pub subject: String,
    pub year: String,
    pub college: String,
    #[serde(rename = "type")]
    #[schema(example = "Notes")]
    pub resource_type: String,
    pub description: String,
    /// Uploader display name at upload time.
    pub uploaded_by: String,
    pub download_count: u64,
    /// Creation date, `YYYY-MM-DD` in UTC.
    #[schema(example = "2024-03-09")]
    pub upload_date: String,
}

impl From<&Resource> for ResourceView {
    fn from(resource: &Resource) -> Self {
        let metadata = &resource.metadata;
        Self {
            id: resource.id.to_string(),
            title: metadata.title().to_owned(),
            subject: metadata.subject().to_owned(),
            year: metadata.year().to_owned(),
            college: metadata.college().to_owned(),
            resource_type: metadata.resource_type().as_str().to_owned(),
            description: metadata.description().to_owned(),
            uploaded_by: resource.uploader_name.clone(),
            download_count: resource.download_count,
            upload_date: resource.upload_date(),
        }
    }
}

/// Pagination block of a listing response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct PaginationView {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl From<PageInfo> for PaginationView {
    fn from(info: PageInfo) -> Self {
        Self {
            page: info.page,
            limit: info.limit,
            total: info.total,
            pages: info.pages,
        }
    }
}

/// Body returned by `GET /api/resources`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ResourceListResponse {
    pub resources: Vec<ResourceView>,
    pub pagination: PaginationView,
}

/// Body returned by `POST /api/resources/upload`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub resource: ResourceView,
}

/// List resources matching the query, newest first.
#[utoipa::path(
    get,
    path = "/api/resources",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of resources", body = ResourceListResponse),
        (status = 400, description = "Invalid page or limit", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["resources"],
    operation_id = "listResources",
    security([])
)]
#[get("/resources")]
pub async fn list_resources(
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<ResourceListResponse>> {
    let (filter, request) = query.into_inner().into_parts()?;
    let page = state.catalogue.list(filter, request).await?;
    Ok(web::Json(ResourceListResponse {
        resources: page.items.iter().map(ResourceView::from).collect(),
        pagination: PaginationView::from(page.info),
    }))
}

/// Upload form as read from the multipart body.
#[derive(Debug, Default)]
struct UploadForm {
    draft: MetadataDraft,
    file: Option<IncomingFile>,
}

fn map_multipart_error(error: MultipartError) -> Error {
    warn!(%error, "rejected multipart body");
    Error::invalid_request(INVALID_MULTIPART_MESSAGE)
}

async fn read_text(mut field: Field) -> Result<String, Error> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
        if buffer.len() + chunk.len() > TEXT_FIELD_LIMIT {
            return Err(Error::invalid_request(INVALID_MULTIPART_MESSAGE));
        }
        buffer.extend_from_slice(&chunk);
    }
    String::from_utf8(buffer.to_vec())
        .map_err(|_| Error::invalid_request(INVALID_MULTIPART_MESSAGE))
}

/// Read the document part, refusing bad extensions before any byte is read
/// and aborting once the running size passes the policy limit.
async fn read_file(mut field: Field, policy: &UploadPolicy) -> Result<IncomingFile, Error> {
    let original_name = field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .unwrap_or_default()
        .to_owned();
    policy
        .check_name(&original_name)
        .map_err(map_upload_rejection)?;

    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
        let running = u64::try_from(buffer.len() + chunk.len()).unwrap_or(u64::MAX);
        policy.check_size(running).map_err(map_upload_rejection)?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(IncomingFile {
        original_name,
        content: buffer.freeze(),
    })
}

async fn drain(mut field: Field) -> Result<(), Error> {
    while field.try_next().await.map_err(map_multipart_error)?.is_some() {}
    Ok(())
}

async fn read_upload_form(mut payload: Multipart, policy: &UploadPolicy) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    while let Some(field) = payload.try_next().await.map_err(map_multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            FILE_FIELD if form.file.is_none() => form.file = Some(read_file(field, policy).await?),
            "title" => form.draft.title = Some(read_text(field).await?),
            "subject" => form.draft.subject = Some(read_text(field).await?),
            "year" => form.draft.year = Some(read_text(field).await?),
            "college" => form.draft.college = Some(read_text(field).await?),
            "type" => form.draft.resource_type = Some(read_text(field).await?),
            "description" => form.draft.description = Some(read_text(field).await?),
            other => {
                debug!(field = other, "ignoring multipart field");
                drain(field).await?;
            }
        }
    }
    Ok(form)
}

/// Upload a document with its metadata.
///
/// File type and size are checked while the body streams in; metadata is
/// validated once the whole form has been read.
#[utoipa::path(
    post,
    path = "/api/resources/upload",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields title, subject, year, college, type, description and a `file` part (.pdf, .doc, .docx; at most 10 MiB)."
    ),
    responses(
        (status = 201, description = "Resource stored", body = UploadResponse),
        (status = 400, description = "Missing metadata, missing file, bad file type or size", body = ErrorBody),
        (status = 401, description = "No bearer token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
        (status = 404, description = "Uploader no longer exists", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["resources"],
    operation_id = "uploadResource"
)]
#[post("/resources/upload")]
pub async fn upload_resource(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let form = read_upload_form(payload, &state.upload_policy).await?;
    let metadata = ResourceMetadata::try_from(form.draft)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let file = form
        .file
        .ok_or_else(|| Error::invalid_request(FILE_REQUIRED_MESSAGE))?;
    let resource = state
        .resources
        .upload(&auth.claims().user_id, metadata, file)
        .await?;
    Ok(HttpResponse::Created().json(UploadResponse {
        message: UPLOADED_MESSAGE.to_owned(),
        resource: ResourceView::from(&resource),
    }))
}

/// Stream a stored document and count the download.
#[utoipa::path(
    get,
    path = "/api/resources/{id}/download",
    params(("id" = String, Path, description = "Resource identifier")),
    responses(
        (status = 200, description = "Document bytes", content_type = "application/octet-stream", body = Vec<u8>,
            headers(("Content-Disposition" = String, description = "attachment; filename=\"<original name>\""))),
        (status = 404, description = "Unknown resource or file missing on the server", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["resources"],
    operation_id = "downloadResource",
    security([])
)]
#[get("/resources/{id}/download")]
pub async fn download_resource(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = ResourceId::parse(&path.into_inner())
        .ok_or_else(|| Error::not_found(RESOURCE_NOT_FOUND_MESSAGE))?;
    let download = state.resources.download(&id).await?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(
            download.resource.file.original_name.clone(),
        )],
    };
    Ok(HttpResponse::Ok()
        .insert_header(ContentType::octet_stream())
        .insert_header(disposition)
        .no_chunking(download.size)
        .streaming(download.stream))
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
