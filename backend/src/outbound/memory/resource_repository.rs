//! Mutex-guarded [`ResourceRepository`].

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::ports::{ResourcePersistenceError, ResourceRepository};
use crate::domain::{
    CatalogueTotals, FilterValues, NewResource, RECENT_UPLOADS_LIMIT, RecentUpload, Resource,
    ResourceFilter, ResourceId, SubjectCount, rank_subjects,
};

/// Resources kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryResourceRepository {
    resources: Mutex<Vec<Resource>>,
}

impl InMemoryResourceRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Resource>>, ResourcePersistenceError> {
        self.resources
            .lock()
            .map_err(|_| ResourcePersistenceError::query("resource store lock poisoned"))
    }
}

fn newest_first(resources: &mut [Resource]) {
    resources.sort_by_key(|resource| Reverse((resource.created_at, *resource.id.as_uuid())));
}

fn recent_uploads(resources: &[Resource]) -> Vec<RecentUpload> {
    let mut newest = resources.to_vec();
    newest_first(&mut newest);
    newest
        .into_iter()
        .take(RECENT_UPLOADS_LIMIT)
        .map(|resource| RecentUpload {
            title: resource.metadata.title().to_owned(),
            subject: resource.metadata.subject().to_owned(),
            uploader_name: resource.uploader_name,
            created_at: resource.created_at,
        })
        .collect()
}

fn subject_counts(resources: &[Resource]) -> Vec<SubjectCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for resource in resources {
        *counts.entry(resource.metadata.subject()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(subject, count)| SubjectCount {
            subject: subject.to_owned(),
            count,
        })
        .collect()
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn insert(&self, resource: &NewResource) -> Result<Resource, ResourcePersistenceError> {
        let stored = Resource::from_new(resource.clone());
        self.lock()?.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourcePersistenceError> {
        Ok(self.lock()?.iter().find(|r| &r.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ResourcePersistenceError> {
        let mut matching: Vec<Resource> = self
            .lock()?
            .iter()
            .filter(|resource| filter.matches(resource))
            .cloned()
            .collect();
        newest_first(&mut matching);

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(offset).take(limit).collect();
        Ok(Paginated::new(items, page, total))
    }

    async fn increment_downloads(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourcePersistenceError> {
        let mut resources = self.lock()?;
        Ok(resources.iter_mut().find(|r| &r.id == id).map(|resource| {
            resource.download_count += 1;
            resource.clone()
        }))
    }

    async fn totals(&self) -> Result<CatalogueTotals, ResourcePersistenceError> {
        let resources = self.lock()?;
        Ok(CatalogueTotals {
            total_resources: resources.len() as u64,
            total_downloads: resources.iter().map(|r| r.download_count).sum(),
            top_subjects: rank_subjects(subject_counts(&resources)),
            recent_uploads: recent_uploads(&resources),
        })
    }

    async fn filter_values(&self) -> Result<FilterValues, ResourcePersistenceError> {
        let resources = self.lock()?;
        let column = |pick: fn(&Resource) -> &str| -> Vec<String> {
            resources.iter().map(|r| pick(r).to_owned()).collect()
        };
        Ok(FilterValues::from_unsorted(
            column(|r| r.metadata.subject()),
            column(|r| r.metadata.year()),
            column(|r| r.metadata.college()),
            column(|r| r.metadata.resource_type().as_str()),
        ))
    }
}

#[cfg(test)]
#[path = "resource_repository_tests.rs"]
mod tests;
