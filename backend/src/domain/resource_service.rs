//! Resource domain service.
//!
//! Coordinates the blob store and resource repository for uploads and
//! downloads, and serves catalogue queries. Upload writes the file first and
//! removes it again if the metadata cannot be persisted; a crash between the
//! two steps can still leave an unreferenced file behind.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageRequest, Paginated};
use tracing::{info, warn};

use crate::domain::account_service::{USER_NOT_FOUND_MESSAGE, map_user_error};
use crate::domain::ports::{
    BlobStore, BlobStoreError, Download, ResourceCommand, ResourcePersistenceError,
    ResourceQuery, ResourceRepository, UserRepository,
};
use crate::domain::{
    Error, FilterValues, IncomingFile, NewResource, Resource, ResourceFilter, ResourceId,
    ResourceMetadata, ResourceStats, StoredFile, UploadPolicy, UploadRejection, UserId,
};

/// Message for an unknown resource id.
pub const RESOURCE_NOT_FOUND_MESSAGE: &str = "Resource not found";
/// Message for a resource whose stored file is gone.
pub const FILE_NOT_FOUND_MESSAGE: &str = "File not found on server";

fn map_resource_error(error: ResourcePersistenceError) -> Error {
    match error {
        ResourcePersistenceError::Connection { message } => {
            Error::internal(format!("resource repository unavailable: {message}"))
        }
        ResourcePersistenceError::Query { message } => {
            Error::internal(format!("resource repository error: {message}"))
        }
    }
}

fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::NotFound { .. } => Error::not_found(FILE_NOT_FOUND_MESSAGE),
        BlobStoreError::Io { message } => Error::internal(format!("blob store error: {message}")),
    }
}

pub(crate) fn map_upload_rejection(rejection: UploadRejection) -> Error {
    match rejection {
        UploadRejection::UnsupportedFileType => Error::unsupported_file_type(rejection.to_string()),
        UploadRejection::TooLarge { .. } => Error::file_too_large(rejection.to_string()),
    }
}

/// Resource service implementing [`ResourceCommand`] and [`ResourceQuery`].
#[derive(Clone)]
pub struct ResourceService<R, U, B> {
    resources: Arc<R>,
    users: Arc<U>,
    blobs: Arc<B>,
    policy: UploadPolicy,
    clock: Arc<dyn Clock>,
}

impl<R, U, B> ResourceService<R, U, B> {
    /// Create a service over the given ports and upload limits.
    pub fn new(
        resources: Arc<R>,
        users: Arc<U>,
        blobs: Arc<B>,
        policy: UploadPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resources,
            users,
            blobs,
            policy,
            clock,
        }
    }
}

impl<R, U, B> ResourceService<R, U, B>
where
    B: BlobStore,
{
    async fn discard(&self, stored_name: &str) {
        if let Err(error) = self.blobs.remove(stored_name).await {
            warn!(stored_name, %error, "failed to remove orphaned upload");
        }
    }
}

#[async_trait]
impl<R, U, B> ResourceCommand for ResourceService<R, U, B>
where
    R: ResourceRepository,
    U: UserRepository,
    B: BlobStore,
{
    async fn upload(
        &self,
        uploader: &UserId,
        metadata: ResourceMetadata,
        file: IncomingFile,
    ) -> Result<Resource, Error> {
        let size = u64::try_from(file.content.len()).unwrap_or(u64::MAX);
        let format = self
            .policy
            .check(&file.original_name, size)
            .map_err(map_upload_rejection)?;
        let user = self
            .users
            .find_by_id(uploader)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))?;

        let stored_name = self
            .blobs
            .store(format, file.content)
            .await
            .map_err(map_blob_error)?;

        let new_resource = NewResource {
            id: ResourceId::random(),
            metadata,
            file: StoredFile {
                original_name: file.original_name,
                stored_name: stored_name.clone(),
                size,
            },
            uploaded_by: *user.id(),
            uploader_name: user.name().clone(),
            created_at: self.clock.utc(),
        };

        match self.resources.insert(&new_resource).await {
            Ok(resource) => {
                info!(resource_id = %resource.id, user_id = %uploader, size, "resource uploaded");
                Ok(resource)
            }
            Err(error) => {
                self.discard(&stored_name).await;
                Err(map_resource_error(error))
            }
        }
    }

    async fn download(&self, id: &ResourceId) -> Result<Download, Error> {
        let resource = self
            .resources
            .find_by_id(id)
            .await
            .map_err(map_resource_error)?
            .ok_or_else(|| Error::not_found(RESOURCE_NOT_FOUND_MESSAGE))?;

        let content = self
            .blobs
            .open(&resource.file.stored_name)
            .await
            .map_err(map_blob_error)?;

        let updated = self
            .resources
            .increment_downloads(id)
            .await
            .map_err(map_resource_error)?
            .ok_or_else(|| Error::not_found(RESOURCE_NOT_FOUND_MESSAGE))?;

        info!(resource_id = %id, downloads = updated.download_count, "resource downloaded");
        Ok(Download {
            resource: updated,
            stream: content.stream,
            size: content.size,
        })
    }
}

#[async_trait]
impl<R, U, B> ResourceQuery for ResourceService<R, U, B>
where
    R: ResourceRepository,
    U: UserRepository,
    B: BlobStore,
{
    async fn list(
        &self,
        filter: ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, Error> {
        self.resources
            .list(&filter, page)
            .await
            .map_err(map_resource_error)
    }

    async fn stats(&self) -> Result<ResourceStats, Error> {
        let totals = self.resources.totals().await.map_err(map_resource_error)?;
        let total_users = self.users.count().await.map_err(map_user_error)?;
        Ok(ResourceStats::new(totals, total_users))
    }

    async fn filter_values(&self) -> Result<FilterValues, Error> {
        self.resources
            .filter_values()
            .await
            .map_err(map_resource_error)
    }
}

#[cfg(test)]
#[path = "resource_service_tests.rs"]
mod tests;
