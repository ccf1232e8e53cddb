//! Descriptor ownership.

use std::fmt;
use std::sync::Arc;

use crate::backend::{Backend, RawFd};
use crate::{FileIoError, FileIoResult};

/// Owns one descriptor and releases it at most once.
///
/// A guard is move-only. Closing a guard twice fails with
/// [`FileIoErrorKind::BadDescriptor`](crate::FileIoErrorKind::BadDescriptor)
/// without reaching the backend. Owned guards close on drop; borrowed guards
/// only close when asked to.
pub struct FdGuard {
    fd: RawFd,
    owned: bool,
    closed: bool,
    tag: Option<u64>,
    backend: Arc<dyn Backend>,
}

impl FdGuard {
    pub fn new(backend: Arc<dyn Backend>, fd: RawFd) -> FileIoResult<Self> {
        Self::build(backend, fd, true)
    }

    pub fn borrowed(backend: Arc<dyn Backend>, fd: RawFd) -> FileIoResult<Self> {
        Self::build(backend, fd, false)
    }

    fn build(backend: Arc<dyn Backend>, fd: RawFd, owned: bool) -> FileIoResult<Self> {
        if fd < 0 {
            return Err(FileIoError::invalid_argument("fd_guard.new"));
        }
        Ok(Self {
            fd,
            owned,
            closed: false,
            tag: None,
            backend,
        })
    }

    /// Attach an ownership tag checked by the backend on close.
    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn fd(&self) -> FileIoResult<RawFd> {
        if self.closed {
            return Err(FileIoError::bad_descriptor("fd_guard.fd"));
        }
        Ok(self.fd)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn tag(&self) -> Option<u64> {
        self.tag
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn close(&mut self) -> FileIoResult<()> {
        if self.closed {
            return Err(FileIoError::bad_descriptor("fd_guard.close"));
        }
        self.closed = true;
        self.release().map_err(|code| {
            tracing::error!(fd = self.fd, %code, "failed to close descriptor");
            FileIoError::from_native("fd_guard.close", code.0)
        })
    }

    /// Give up ownership without closing.
    pub fn into_raw_fd(mut self) -> FileIoResult<RawFd> {
        let fd = self.fd()?;
        self.closed = true;
        Ok(fd)
    }

    fn release(&self) -> crate::BackendResult<()> {
        match self.tag {
            Some(tag) => self.backend.close_with_tag(self.fd, tag),
            None => self.backend.close(self.fd),
        }
    }
}

impl fmt::Debug for FdGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdGuard")
            .field("fd", &self.fd)
            .field("owned", &self.owned)
            .field("closed", &self.closed)
            .field("tag", &self.tag)
            .finish()
    }
}

impl Drop for FdGuard {
    fn drop(&mut self) {
        if self.closed || !self.owned {
            return;
        }
        self.closed = true;
        if let Err(code) = self.release() {
            tracing::warn!(fd = self.fd, %code, "failed to close descriptor on drop");
        }
    }
}
