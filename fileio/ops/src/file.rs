use fileio_core::path;
use fileio_core::{FdGuard, FileIoError, FileIoResult, LockOp, RawFd};

use crate::check;

/// An open file returned by [`FileIo::open`](crate::FileIo::open) and
/// [`FileIo::dup`](crate::FileIo::dup).
///
/// The descriptor is owned; dropping the file closes it.
#[derive(Debug)]
pub struct FsFile {
    guard: FdGuard,
    path: String,
}

impl FsFile {
    pub(crate) fn new(guard: FdGuard, path: String) -> Self {
        Self { guard, path }
    }

    pub fn fd(&self) -> FileIoResult<RawFd> {
        self.guard.fd()
    }

    /// The URI the file was opened from, or its canonical host path.
    pub fn path(&self) -> FileIoResult<&str> {
        self.guard.fd()?;
        Ok(&self.path)
    }

    pub fn name(&self) -> FileIoResult<&str> {
        let path = self.path()?;
        Ok(path::file_name(path).unwrap_or(path))
    }

    pub fn parent(&self) -> FileIoResult<&str> {
        let path = self.path()?;
        match path::parent(path) {
            Some("") => Ok("/"),
            Some(parent) => Ok(parent),
            None => Err(FileIoError::invalid_argument("file.parent")),
        }
    }

    /// Take an advisory lock, waiting for conflicting holders.
    pub fn lock(&self, exclusive: bool) -> FileIoResult<()> {
        let op = if exclusive {
            LockOp::Exclusive
        } else {
            LockOp::Shared
        };
        self.flock("file.lock", op)
    }

    /// Take an advisory lock or fail immediately.
    pub fn try_lock(&self, exclusive: bool) -> FileIoResult<()> {
        let op = if exclusive {
            LockOp::ExclusiveNonBlocking
        } else {
            LockOp::SharedNonBlocking
        };
        self.flock("file.try_lock", op)
    }

    pub fn unlock(&self) -> FileIoResult<()> {
        self.flock("file.unlock", LockOp::Unlock)
    }

    fn flock(&self, context: &'static str, op: LockOp) -> FileIoResult<()> {
        let fd = self.guard.fd()?;
        check(context, self.guard.backend().flock(fd, op))
    }

    /// Close the file. A second close fails with
    /// [`FileIoErrorKind::BadDescriptor`](fileio_core::FileIoErrorKind::BadDescriptor).
    pub fn close(&mut self) -> FileIoResult<()> {
        self.guard.close()
    }

    /// Give up ownership of the descriptor without closing it.
    pub fn into_raw_fd(self) -> FileIoResult<RawFd> {
        self.guard.into_raw_fd()
    }
}
