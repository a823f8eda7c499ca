//! Blob storage adapters for uploaded documents.

mod fs_blob_store;

pub use fs_blob_store::FsBlobStore;
