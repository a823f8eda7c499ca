//! Driving port for upload and download use-cases.

use async_trait::async_trait;

use crate::domain::{Error, IncomingFile, Resource, ResourceId, ResourceMetadata, UserId};

use super::ByteStream;

/// A resource whose counter has been bumped, with its content ready to send.
pub struct Download {
    /// Record after the increment.
    pub resource: Resource,
    /// Stored file content.
    pub stream: ByteStream,
    /// Content length in bytes.
    pub size: u64,
}

/// Mutating resource operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceCommand: Send + Sync {
    /// Store a document and its metadata on behalf of `uploader`.
    async fn upload(
        &self,
        uploader: &UserId,
        metadata: ResourceMetadata,
        file: IncomingFile,
    ) -> Result<Resource, Error>;

    /// Count a download and open the stored file.
    async fn download(&self, id: &ResourceId) -> Result<Download, Error>;
}
