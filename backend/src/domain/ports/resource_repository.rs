//! Driven port for resource metadata and download counters.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{CatalogueTotals, FilterValues, NewResource, Resource, ResourceFilter, ResourceId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by resource repository adapters.
    pub enum ResourcePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "resource repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "resource repository query failed: {message}",
    }
}

/// Storage for uploaded-document metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Persist a new resource with a zero download counter.
    async fn insert(&self, resource: &NewResource) -> Result<Resource, ResourcePersistenceError>;

    /// Fetch a resource by id.
    async fn find_by_id(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourcePersistenceError>;

    /// Return one page of resources matching `filter`, newest first.
    async fn list(
        &self,
        filter: &ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ResourcePersistenceError>;

    /// Atomically add one to the download counter and return the updated
    /// record; `None` when the id is unknown.
    async fn increment_downloads(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourcePersistenceError>;

    /// Aggregate counts, top subjects and recent uploads.
    async fn totals(&self) -> Result<CatalogueTotals, ResourcePersistenceError>;

    /// Distinct subject, year, college and type values.
    async fn filter_values(&self) -> Result<FilterValues, ResourcePersistenceError>;
}
