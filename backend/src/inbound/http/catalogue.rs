//! Catalogue-wide read endpoints.
//!
//! ```text
//! GET /api/stats
//! GET /api/filters
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{FilterValues, RecentUpload, ResourceStats, SubjectCount, format_upload_date};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::state::HttpState;

/// Resource count for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct SubjectCountView {
    #[schema(example = "Mathematics")]
    pub subject: String,
    pub count: u64,
}

impl From<SubjectCount> for SubjectCountView {
    fn from(value: SubjectCount) -> Self {
        Self {
            subject: value.subject,
            count: value.count,
        }
    }
}

/// Summary of a recent upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentUploadView {
    pub title: String,
    pub subject: String,
    /// Uploader display name.
    pub uploaded_by: String,
    #[schema(example = "2024-03-09")]
    pub upload_date: String,
}

impl From<RecentUpload> for RecentUploadView {
    fn from(value: RecentUpload) -> Self {
        Self {
            title: value.title,
            subject: value.subject,
            uploaded_by: value.uploader_name,
            upload_date: format_upload_date(value.created_at),
        }
    }
}

/// Aggregate figures across the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total_resources: u64,
    pub total_users: u64,
    pub total_downloads: u64,
    /// Up to five subjects, most resources first.
    pub top_subjects: Vec<SubjectCountView>,
    /// Up to five uploads, newest first.
    pub recent_uploads: Vec<RecentUploadView>,
}

impl From<ResourceStats> for StatsView {
    fn from(value: ResourceStats) -> Self {
        Self {
            total_resources: value.total_resources,
            total_users: value.total_users,
            total_downloads: value.total_downloads,
            top_subjects: value.top_subjects.into_iter().map(Into::into).collect(),
            recent_uploads: value.recent_uploads.into_iter().map(Into::into).collect(),
        }
    }
}

/// Body returned by `GET /api/stats`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StatsResponse {
    pub stats: StatsView,
}

/// Body returned by `GET /api/filters`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct FiltersResponse {
    pub subjects: Vec<String>,
    /// Numeric years newest first, then free-text values.
    pub years: Vec<String>,
    pub colleges: Vec<String>,
    pub types: Vec<String>,
}

impl From<FilterValues> for FiltersResponse {
    fn from(values: FilterValues) -> Self {
        Self {
            subjects: values.subjects,
            years: values.years,
            colleges: values.colleges,
            types: values.types,
        }
    }
}

/// Catalogue statistics.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Catalogue statistics", body = StatsResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["catalogue"],
    operation_id = "stats",
    security([])
)]
#[get("/stats")]
pub async fn stats(state: web::Data<HttpState>) -> ApiResult<web::Json<StatsResponse>> {
    let catalogue_stats = state.catalogue.stats().await?;
    Ok(web::Json(StatsResponse {
        stats: StatsView::from(catalogue_stats),
    }))
}

/// Distinct values for each listing filter.
#[utoipa::path(
    get,
    path = "/api/filters",
    responses(
        (status = 200, description = "Filter values", body = FiltersResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["catalogue"],
    operation_id = "filters",
    security([])
)]
#[get("/filters")]
pub async fn filters(state: web::Data<HttpState>) -> ApiResult<web::Json<FiltersResponse>> {
    let values = state.catalogue.filter_values().await?;
    Ok(web::Json(FiltersResponse::from(values)))
}
