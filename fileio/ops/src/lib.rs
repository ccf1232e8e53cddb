//! The operation dispatcher of the fileio execution core.
//!
//! [`FileIo`] validates each request, classifies its path, issues the
//! primitive calls on an injected [`Backend`] and translates every failure
//! into a [`FileIoError`]. Operations are synchronous; [`FileIo::spawn`] and
//! [`AsyncWork`] move them onto tokio's blocking pool.

mod async_work;
mod batch;
mod file;
mod ops;
mod random_access;
mod reader;
mod stream;

use std::sync::Arc;

pub use fileio_core::{
    Backend, ConflictFiles, FileFilter, FileIoConfig, FileIoError, FileIoErrorKind, FileIoResult,
    FileStat, ListFileOptions, PathCategory, RawFd, TaskSignal, TaskSignalListener,
};
use fileio_core::path::{self, ResolvedPath};
use fileio_core::{BackendResult, FdGuard};
use fileio_host::HostBackend;

pub use self::async_work::{AsyncWork, CompletionQueue};
pub use self::batch::{
    COPY_DIR_OVERWRITE, COPY_DIR_THROW, MOVE_DIR_FILE_REPLACE, MOVE_DIR_FILE_THROW,
    MOVE_DIR_REPLACE, MOVE_DIR_THROW,
};
pub use self::file::FsFile;
pub use self::ops::{
    MOVE_FILE_FORCE, MOVE_FILE_THROW, ReadOptions, ReadTextOptions, WriteOptions, XATTR_MAX_LEN,
};
pub use self::random_access::{RandomAccessFile, RandomAccessOptions};
pub use self::reader::{ReaderIterator, ReaderIteratorResult};
pub use self::stream::FsStream;

/// The only text encoding accepted by the text operations.
pub const UTF8: &str = "utf-8";

/// Identifies the target of an operation, by path or by descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileInfo {
    Path(String),
    Fd(RawFd),
}

impl From<&str> for FileInfo {
    fn from(path: &str) -> Self {
        FileInfo::Path(path.to_string())
    }
}

impl From<String> for FileInfo {
    fn from(path: String) -> Self {
        FileInfo::Path(path)
    }
}

impl From<RawFd> for FileInfo {
    fn from(fd: RawFd) -> Self {
        FileInfo::Fd(fd)
    }
}

/// Dispatches file operations to a [`Backend`].
#[derive(Debug, Clone)]
pub struct FileIo {
    backend: Arc<dyn Backend>,
    config: Arc<FileIoConfig>,
}

impl FileIo {
    pub fn new(backend: Arc<dyn Backend>, config: FileIoConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }

    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self::new(backend, FileIoConfig::default())
    }

    /// A dispatcher over the host operating system.
    pub fn host() -> Self {
        Self::with_backend(Arc::new(HostBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn config(&self) -> &FileIoConfig {
        &self.config
    }

    pub(crate) fn resolve(&self, input: &str) -> FileIoResult<ResolvedPath> {
        path::resolve(input, &self.config, self.backend.as_ref())
    }

    pub(crate) fn guard(&self, fd: RawFd) -> FileIoResult<FdGuard> {
        FdGuard::new(self.backend.clone(), fd)
    }
}

/// Translate a backend result, logging the failure with its context.
pub(crate) fn check<T>(context: &'static str, res: BackendResult<T>) -> FileIoResult<T> {
    res.map_err(|code| {
        tracing::debug!(context, %code, "backend call failed");
        FileIoError::from_native(context, code.0)
    })
}

/// Reject negative descriptors before anything reaches the backend.
pub(crate) fn check_fd(context: &'static str, fd: RawFd) -> FileIoResult<RawFd> {
    if fd < 0 {
        return Err(FileIoError::invalid_argument(context));
    }
    Ok(fd)
}

pub(crate) fn check_encoding(context: &'static str, encoding: Option<&str>) -> FileIoResult<()> {
    match encoding {
        None | Some(UTF8) => Ok(()),
        Some(_) => Err(FileIoError::invalid_argument(context)),
    }
}
