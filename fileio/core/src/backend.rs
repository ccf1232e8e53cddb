//! The injected I/O backend.
//!
//! A [`Backend`] performs exactly one primitive per call and reports failures
//! as a [`BackendCode`] in the backend's own convention (negative errno). The
//! dispatcher is the only place where those codes are translated.

use std::fmt;

use crate::flags::{AccessMode, LockOp, OpenMode};
use crate::stat::{DirEntry, FileStat};

pub type RawFd = i32;

/// A backend failure, `-errno`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackendCode(pub i32);

impl BackendCode {
    pub fn from_errno(errno: i32) -> Self {
        Self(-errno.abs())
    }

    /// The positive errno carried by this code.
    pub fn errno(self) -> i32 {
        self.0.checked_neg().unwrap_or(i32::MAX)
    }

    pub fn is(self, errno: i32) -> bool {
        self.errno() == errno
    }
}

impl fmt::Display for BackendCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match crate::errno::errno_symbol(self.errno()) {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "backend code {}", self.0),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendCode>;

/// Origin for `lseek`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekWhence {
    Start,
    Current,
    End,
}

impl TryFrom<i32> for SeekWhence {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SeekWhence::Start),
            1 => Ok(SeekWhence::Current),
            2 => Ok(SeekWhence::End),
            other => Err(other),
        }
    }
}

/// Blocking primitives issued on behalf of the dispatcher.
///
/// Implementations must be callable from any thread; async dispatch moves
/// calls onto a blocking pool.
pub trait Backend: Send + Sync + fmt::Debug {
    fn open(&self, path: &str, mode: OpenMode, perm: u32) -> BackendResult<RawFd>;

    fn close(&self, fd: RawFd) -> BackendResult<()>;

    /// Close a descriptor that carries an ownership tag.
    ///
    /// Backends without descriptor tagging close normally.
    fn close_with_tag(&self, fd: RawFd, tag: u64) -> BackendResult<()> {
        let _ = tag;
        self.close(fd)
    }

    /// Read into `buf`. `None` reads at, and advances, the descriptor position.
    fn read(&self, fd: RawFd, buf: &mut [u8], offset: Option<u64>) -> BackendResult<usize>;

    /// Write `buf`. `None` writes at, and advances, the descriptor position.
    fn write(&self, fd: RawFd, buf: &[u8], offset: Option<u64>) -> BackendResult<usize>;

    fn lseek(&self, fd: RawFd, offset: i64, whence: SeekWhence) -> BackendResult<u64>;

    fn stat(&self, path: &str) -> BackendResult<FileStat>;

    fn lstat(&self, path: &str) -> BackendResult<FileStat>;

    fn fstat(&self, fd: RawFd) -> BackendResult<FileStat>;

    fn rename(&self, from: &str, to: &str) -> BackendResult<()>;

    fn symlink(&self, target: &str, link: &str) -> BackendResult<()>;

    fn ftruncate(&self, fd: RawFd, len: u64) -> BackendResult<()>;

    fn fsync(&self, fd: RawFd) -> BackendResult<()>;

    fn fdatasync(&self, fd: RawFd) -> BackendResult<()>;

    fn dup(&self, fd: RawFd) -> BackendResult<RawFd>;

    fn readlink(&self, path: &str) -> BackendResult<String>;

    fn realpath(&self, path: &str) -> BackendResult<String>;

    /// Set access and modification times, in nanoseconds since the epoch.
    fn utime(&self, path: &str, atime_ns: i64, mtime_ns: i64) -> BackendResult<()>;

    /// Create a unique directory from a template ending in `XXXXXX`.
    fn mkdtemp(&self, template: &str) -> BackendResult<String>;

    fn access(&self, path: &str, mode: AccessMode) -> BackendResult<()>;

    fn mkdir(&self, path: &str, perm: u32) -> BackendResult<()>;

    fn rmdir(&self, path: &str) -> BackendResult<()>;

    fn unlink(&self, path: &str) -> BackendResult<()>;

    /// List a directory, excluding `.` and `..`.
    fn read_dir(&self, path: &str) -> BackendResult<Vec<DirEntry>>;

    /// Copy a regular file, replacing `dest` if it exists.
    fn copy_file(&self, src: &str, dest: &str) -> BackendResult<()>;

    /// Transfer up to `len` bytes from `in_fd` at `offset` to the position of `out_fd`.
    fn sendfile(&self, out_fd: RawFd, in_fd: RawFd, offset: u64, len: usize)
    -> BackendResult<usize>;

    fn flock(&self, fd: RawFd, op: LockOp) -> BackendResult<()>;

    fn setxattr(&self, path: &str, key: &str, value: &[u8]) -> BackendResult<()>;

    /// Read an extended attribute. A missing attribute yields an empty value.
    fn getxattr(&self, path: &str, key: &str) -> BackendResult<Vec<u8>>;
}
