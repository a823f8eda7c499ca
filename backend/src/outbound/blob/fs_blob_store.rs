//! Filesystem-backed [`BlobStore`] rooted at the upload directory.
//!
//! All access goes through a `cap_std` directory handle so stored names can
//! never address files outside the root. Blocking file I/O runs on the tokio
//! blocking pool; downloads stream through [`ReaderStream`].

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use futures_util::StreamExt;
use mockable::Clock;
use rand::Rng;
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::domain::ports::{BlobContent, BlobStore, BlobStoreError};
use crate::domain::{DocumentFormat, storage_name};

const MAX_NAME_ATTEMPTS: usize = 8;
const NAME_SUFFIX_BOUND: u32 = 1_000_000_000;

/// Documents stored as plain files under a single directory.
pub struct FsBlobStore {
    root: Arc<Dir>,
    root_path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FsBlobStore {
    /// Open `root`, creating it (and missing parents) first.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>, clock: Arc<dyn Clock>) -> io::Result<Self> {
        let root_path = root.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())?;
        let root = Dir::open_ambient_dir(&root_path, ambient_authority())?;
        Ok(Self {
            root: Arc::new(root),
            root_path,
            clock,
        })
    }

    /// Directory the store writes into.
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

fn io_error(err: &io::Error) -> BlobStoreError {
    BlobStoreError::io(err.to_string())
}

async fn run_blocking<T, F>(work: F) -> Result<T, BlobStoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BlobStoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| BlobStoreError::io(format!("blob task failed: {err}")))?
}

fn is_plain_name(name: &str) -> bool {
    Path::new(name).file_name() == Some(OsStr::new(name))
}

fn write_new(dir: &Dir, name: &str, content: &[u8]) -> io::Result<()> {
    let mut file = dir.open_with(name, OpenOptions::new().write(true).create_new(true))?;
    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(err) = written {
        drop(file);
        if let Err(cleanup) = dir.remove_file(name) {
            warn!(stored_name = name, error = %cleanup, "failed to remove partial upload");
        }
        return Err(err);
    }
    Ok(())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(&self, format: DocumentFormat, content: Bytes) -> Result<String, BlobStoreError> {
        let dir = Arc::clone(&self.root);
        let now = self.clock.utc();
        run_blocking(move || {
            for _ in 0..MAX_NAME_ATTEMPTS {
                let suffix = rand::thread_rng().gen_range(0..NAME_SUFFIX_BOUND);
                let name = storage_name(now, suffix, format);
                match write_new(&dir, &name, &content) {
                    Ok(()) => return Ok(name),
                    Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
                    Err(err) => return Err(io_error(&err)),
                }
            }
            Err(BlobStoreError::io("could not allocate a unique stored name"))
        })
        .await
    }

    async fn open(&self, stored_name: &str) -> Result<BlobContent, BlobStoreError> {
        if !is_plain_name(stored_name) {
            return Err(BlobStoreError::not_found(stored_name));
        }
        let dir = Arc::clone(&self.root);
        let name = stored_name.to_owned();
        let (file, size) = run_blocking(move || {
            let file = dir.open(&name).map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => BlobStoreError::not_found(name.as_str()),
                _ => io_error(&err),
            })?;
            let size = file.metadata().map_err(|err| io_error(&err))?.len();
            Ok((file.into_std(), size))
        })
        .await?;

        let stream = ReaderStream::new(tokio::fs::File::from_std(file)).boxed();
        Ok(BlobContent { stream, size })
    }

    async fn remove(&self, stored_name: &str) -> Result<(), BlobStoreError> {
        if !is_plain_name(stored_name) {
            return Ok(());
        }
        let dir = Arc::clone(&self.root);
        let name = stored_name.to_owned();
        run_blocking(move || match dir.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&err)),
        })
        .await
    }
}
