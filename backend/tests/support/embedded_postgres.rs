//! Embedded PostgreSQL fixtures for the Diesel adapter suites.
//!
//! Each suite gets a fresh temporary database on the process-wide cluster
//! started by `pg-embed-setup-unpriv`, migrated with the crate's own
//! embedded migrations. Set `SKIP_TEST_CLUSTER=1` where the cluster cannot
//! start; the suites then log a skip marker instead of failing.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use synapse::domain::{
    DisplayName, EmailAddress, MetadataDraft, NewResource, PasswordHash, ResourceId,
    ResourceMetadata, StoredFile, User, UserAccount, UserId,
};
use synapse::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use synapse::test_support::fixture_timestamp;
use tokio::runtime::Runtime;

const CLUSTER_RETRIES: u32 = 3;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A migrated temporary database plus the runtime that owns its pool.
///
/// Field order matters: the pool closes before the database is dropped.
pub struct PgContext {
    pub runtime: Runtime,
    pub pool: DbPool,
    _database: TemporaryDatabase,
}

/// Whether `SKIP_TEST_CLUSTER` asks for cluster-backed suites to be skipped.
fn skip_requested() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn temporary_database() -> Result<TemporaryDatabase, String> {
    let mut attempt = 1;
    loop {
        let created = pg_embedded_setup_unpriv::test_support::shared_cluster_handle()
            .map_err(|err| format!("start cluster: {err:?}"))
            .and_then(|cluster| {
                let name = format!("synapse_test_{}", uuid::Uuid::new_v4().simple());
                cluster
                    .temporary_database(name.as_str())
                    .map_err(|err| format!("create database: {err:?}"))
            });
        match created {
            Ok(database) => return Ok(database),
            Err(reason) if attempt >= CLUSTER_RETRIES => return Err(reason),
            Err(_) => {
                std::thread::sleep(CLUSTER_RETRY_DELAY * attempt);
                attempt += 1;
            }
        }
    }
}

fn setup(max_connections: u32) -> Result<PgContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = temporary_database()?;
    let url = database.url().to_string();

    let pool = runtime.block_on(async {
        run_migrations(&url).await.map_err(|err| err.to_string())?;
        let config = PoolConfig::new(url.as_str())
            .with_max_size(max_connections)
            .with_min_idle(Some(1));
        DbPool::new(config).await.map_err(|err| err.to_string())
    })?;

    Ok(PgContext {
        runtime,
        pool,
        _database: database,
    })
}

/// Provision a database, or `None` when skipping is allowed.
///
/// # Panics
///
/// Panics when the cluster fails and `SKIP_TEST_CLUSTER` is not set, so CI
/// never passes silently.
pub fn pg_context(max_connections: u32) -> Option<PgContext> {
    match setup(max_connections) {
        Ok(context) => Some(context),
        Err(reason) if skip_requested() => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            None
        }
        Err(reason) => {
            panic!("embedded PostgreSQL setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.")
        }
    }
}

/// Account with a placeholder hash; the adapters never inspect it.
pub fn account(name: &str, email: &str) -> UserAccount {
    UserAccount {
        user: User::new(
            UserId::random(),
            DisplayName::new(name).expect("display name"),
            EmailAddress::new(email).expect("email"),
            Some("MIT".to_owned()),
            fixture_timestamp(),
        ),
        password_hash: PasswordHash::new("$2b$04$placeholderplaceholderplaceholderplaceholde"),
    }
}

/// Metadata fields for a seeded resource.
pub struct Seed<'a> {
    pub title: &'a str,
    pub subject: &'a str,
    pub year: &'a str,
    pub college: &'a str,
    pub kind: &'a str,
}

/// Resource uploaded by `uploader`, created `minutes` after the fixture time.
pub fn new_resource(uploader: &UserAccount, seed: &Seed<'_>, minutes: i64) -> NewResource {
    let id = ResourceId::random();
    let metadata = ResourceMetadata::try_from(MetadataDraft {
        title: Some(seed.title.to_owned()),
        subject: Some(seed.subject.to_owned()),
        year: Some(seed.year.to_owned()),
        college: Some(seed.college.to_owned()),
        resource_type: Some(seed.kind.to_owned()),
        description: Some("graph theory appendix".to_owned()),
    })
    .expect("valid metadata");
    NewResource {
        file: StoredFile {
            original_name: format!("{}.pdf", seed.title),
            stored_name: format!("file-{id}.pdf"),
            size: 1024,
        },
        id,
        metadata,
        uploaded_by: uploader.user.id().clone(),
        uploader_name: uploader.user.name().clone(),
        created_at: at_minute(minutes),
    }
}

/// Fixture time shifted by whole minutes.
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
    fixture_timestamp() + TimeDelta::minutes(minutes)
}
