//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerSettings;
pub use state_builders::{StateDependencies, build_diesel_state, build_in_memory_state};

use actix_cors::Cors;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::auth::{login, profile, register};
use crate::inbound::http::catalogue::{filters, stats};
use crate::inbound::http::error::{json_error_handler, not_found, query_error_handler};
use crate::inbound::http::health::{HealthState, health, live, ready};
use crate::inbound::http::resources::{download_resource, list_resources, upload_resource};
use crate::inbound::http::state::HttpState;

/// Seconds browsers may cache a CORS preflight response.
const CORS_MAX_AGE_SECS: usize = 3600;

/// Shared state handed to every worker's application instance.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    /// Origin allowed by the CORS layer; `*` allows any origin.
    pub frontend_url: String,
}

fn cors_for(frontend_url: &str) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(CORS_MAX_AGE_SECS);
    if frontend_url == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(frontend_url)
    }
}

/// Assemble the application: REST API under `/api`, orchestration probes at
/// the root, and a JSON 404 for everything else.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        frontend_url,
    } = deps;

    let api = web::scope("/api")
        .service(health)
        .service(register)
        .service(login)
        .service(profile)
        .service(list_resources)
        .service(upload_resource)
        .service(download_resource)
        .service(stats)
        .service(filters);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(cors_for(&frontend_url))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(not_found))
}

/// Construct an Actix HTTP server for the given application state.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(deps: AppDependencies, bind_addr: &str) -> std::io::Result<Server> {
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}
