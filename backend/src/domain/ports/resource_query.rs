//! Driving port for read-only catalogue queries.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{Error, FilterValues, Resource, ResourceFilter, ResourceStats};

/// Catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceQuery: Send + Sync {
    /// One page of matching resources, newest first.
    async fn list(
        &self,
        filter: ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, Error>;

    /// Catalogue-wide statistics.
    async fn stats(&self) -> Result<ResourceStats, Error>;

    /// Values available for each listing filter.
    async fn filter_values(&self) -> Result<FilterValues, Error>;
}
