//! Domain primitives, aggregates and services.
//!
//! Purpose: define the transport-agnostic types of the resource-sharing
//! service and the services that implement its driving ports. Adapters live
//! under `inbound` and `outbound`; nothing here knows about HTTP, SQL or the
//! filesystem.
//!
//! Public surface:
//! - Error / ErrorCode: failure taxonomy rendered by inbound adapters.
//! - User, UserAccount, Registration, LoginCredentials: the credential model.
//! - Resource, ResourceMetadata, ResourceFilter, ResourceStats, FilterValues:
//!   the shared-document model.
//! - AccountService, ResourceService: driving port implementations.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod resource;
pub mod resource_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    AccessToken, AuthSession, LoginCredentials, LoginValidationError, PASSWORD_MIN_CHARS,
    PasswordHash, Registration, RegistrationValidationError, TokenClaims,
};
pub use self::error::{Error, ErrorCode};
pub use self::resource::{
    CatalogueTotals, DEFAULT_MAX_UPLOAD_BYTES, DocumentFormat, FilterValues, IncomingFile,
    MetadataDraft, MetadataValidationError, NewResource, RECENT_UPLOADS_LIMIT, RecentUpload,
    Resource, ResourceFilter, ResourceId, ResourceMetadata, ResourceStats, ResourceType,
    StoredFile, SubjectCount, TOP_SUBJECTS_LIMIT, UnknownResourceType, UploadPolicy,
    UploadRejection, compare_years, format_upload_date, rank_subjects, storage_name,
};
pub use self::resource_service::ResourceService;
pub use self::trace_id::TraceId;
pub use self::user::{
    DisplayName, EmailAddress, User, UserAccount, UserId, UserValidationError, normalise_college,
};

/// Header carrying the request trace identifier on every response.
pub const TRACE_ID_HEADER: &str = "trace-id";
