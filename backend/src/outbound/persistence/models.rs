//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! reach the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{resources, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub college: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub college: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the resources table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResourceRow {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub year: String,
    pub college: String,
    pub resource_type: String,
    pub description: String,
    pub file_name: String,
    pub stored_name: String,
    pub file_size: i64,
    pub uploaded_by: Uuid,
    pub uploader_name: String,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating resource records. `download_count` takes
/// its column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = resources)]
pub(crate) struct NewResourceRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub subject: &'a str,
    pub year: &'a str,
    pub college: &'a str,
    pub resource_type: &'a str,
    pub description: &'a str,
    pub file_name: &'a str,
    pub stored_name: &'a str,
    pub file_size: i64,
    pub uploaded_by: Uuid,
    pub uploader_name: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Projection used for the recent uploads summary.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecentUploadRow {
    pub title: String,
    pub subject: String,
    pub uploader_name: String,
    pub created_at: DateTime<Utc>,
}
