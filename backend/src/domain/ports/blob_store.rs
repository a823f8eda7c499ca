//! Driven port for durable document bytes.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

use crate::domain::DocumentFormat;

use super::define_port_error;

/// Lazy, finite sequence of file chunks.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// No file exists under the stored name.
        NotFound { stored_name: String } => "stored file {stored_name} not found",
        /// Reading or writing the backing storage failed.
        Io { message: String } => "blob store i/o failed: {message}",
    }
}

/// An opened stored file.
pub struct BlobContent {
    /// File content, read on demand.
    pub stream: ByteStream,
    /// Length of the content in bytes.
    pub size: u64,
}

/// Storage for uploaded document bytes under generated unique names.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `content` under a fresh unique name ending in the format's
    /// extension and return that name.
    async fn store(&self, format: DocumentFormat, content: Bytes) -> Result<String, BlobStoreError>;

    /// Open a stored file for streaming.
    async fn open(&self, stored_name: &str) -> Result<BlobContent, BlobStoreError>;

    /// Delete a stored file.
    async fn remove(&self, stored_name: &str) -> Result<(), BlobStoreError>;
}
