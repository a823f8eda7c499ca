//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: all HTTP endpoints from the inbound layer (auth, resources,
//!   catalogue, health)
//! - **Schemas**: the request and response bodies, including the shared
//!   [`ErrorBody`] shape
//! - **Security**: bearer token authentication scheme
//!
//! The generated document is served by Swagger UI in debug builds.

use crate::inbound::http::auth::{
    AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, UserView,
};
use crate::inbound::http::catalogue::{
    FiltersResponse, RecentUploadView, StatsResponse, StatsView, SubjectCountView,
};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::health::HealthResponse;
use crate::inbound::http::resources::{
    PaginationView, ResourceListResponse, ResourceView, UploadResponse,
};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Synapse API",
        description = "Share, search and download study resources.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::profile,
        crate::inbound::http::resources::list_resources,
        crate::inbound::http::resources::upload_resource,
        crate::inbound::http::resources::download_resource,
        crate::inbound::http::catalogue::stats,
        crate::inbound::http::catalogue::filters,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorBody,
        RegisterRequest,
        LoginRequest,
        UserView,
        AuthResponse,
        ProfileResponse,
        ResourceView,
        PaginationView,
        ResourceListResponse,
        UploadResponse,
        SubjectCountView,
        RecentUploadView,
        StatsView,
        StatsResponse,
        FiltersResponse,
        HealthResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and profile"),
        (name = "resources", description = "Listing, upload and download of documents"),
        (name = "catalogue", description = "Catalogue statistics and filter values"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
