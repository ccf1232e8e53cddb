//! [`Backend`] implementation over the host operating system.

mod platform;

use fileio_core::flags::{AccessMode, LockOp, OpenMode};
use fileio_core::stat::{DirEntry, FileStat};
use fileio_core::{Backend, BackendCode, BackendResult, RawFd, SeekWhence};

/// Issues every primitive as a blocking host syscall.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostBackend;

impl HostBackend {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn map_io_error(context: &'static str, err: std::io::Error) -> BackendCode {
    let errno = err.raw_os_error().unwrap_or(match err.kind() {
        std::io::ErrorKind::InvalidInput => libc::EINVAL,
        std::io::ErrorKind::NotFound => libc::ENOENT,
        _ => libc::EIO,
    });
    tracing::trace!(context, errno, "host call failed");
    BackendCode::from_errno(errno)
}

pub(crate) fn io_result<T>(context: &'static str, result: std::io::Result<T>) -> BackendResult<T> {
    result.map_err(|err| map_io_error(context, err))
}

impl Backend for HostBackend {
    fn open(&self, path: &str, mode: OpenMode, perm: u32) -> BackendResult<RawFd> {
        io_result("open", platform::open(path, mode, perm))
    }

    fn close(&self, fd: RawFd) -> BackendResult<()> {
        io_result("close", platform::close(fd))
    }

    fn read(&self, fd: RawFd, buf: &mut [u8], offset: Option<u64>) -> BackendResult<usize> {
        io_result("read", platform::read(fd, buf, offset))
    }

    fn write(&self, fd: RawFd, buf: &[u8], offset: Option<u64>) -> BackendResult<usize> {
        io_result("write", platform::write(fd, buf, offset))
    }

    fn lseek(&self, fd: RawFd, offset: i64, whence: SeekWhence) -> BackendResult<u64> {
        io_result("lseek", platform::lseek(fd, offset, whence))
    }

    fn stat(&self, path: &str) -> BackendResult<FileStat> {
        io_result("stat", platform::stat(path))
    }

    fn lstat(&self, path: &str) -> BackendResult<FileStat> {
        io_result("lstat", platform::lstat(path))
    }

    fn fstat(&self, fd: RawFd) -> BackendResult<FileStat> {
        io_result("fstat", platform::fstat(fd))
    }

    fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
        io_result("rename", platform::rename(from, to))
    }

    fn symlink(&self, target: &str, link: &str) -> BackendResult<()> {
        io_result("symlink", platform::symlink(target, link))
    }

    fn ftruncate(&self, fd: RawFd, len: u64) -> BackendResult<()> {
        io_result("ftruncate", platform::ftruncate(fd, len))
    }

    fn fsync(&self, fd: RawFd) -> BackendResult<()> {
        io_result("fsync", platform::fsync(fd))
    }

    fn fdatasync(&self, fd: RawFd) -> BackendResult<()> {
        io_result("fdatasync", platform::fdatasync(fd))
    }

    fn dup(&self, fd: RawFd) -> BackendResult<RawFd> {
        io_result("dup", platform::dup(fd))
    }

    fn readlink(&self, path: &str) -> BackendResult<String> {
        io_result("readlink", platform::readlink(path))
    }

    fn realpath(&self, path: &str) -> BackendResult<String> {
        io_result("realpath", platform::realpath(path))
    }

    fn utime(&self, path: &str, atime_ns: i64, mtime_ns: i64) -> BackendResult<()> {
        io_result("utime", platform::utime(path, atime_ns, mtime_ns))
    }

    fn mkdtemp(&self, template: &str) -> BackendResult<String> {
        io_result("mkdtemp", platform::mkdtemp(template))
    }

    fn access(&self, path: &str, mode: AccessMode) -> BackendResult<()> {
        io_result("access", platform::access(path, mode))
    }

    fn mkdir(&self, path: &str, perm: u32) -> BackendResult<()> {
        io_result("mkdir", platform::mkdir(path, perm))
    }

    fn rmdir(&self, path: &str) -> BackendResult<()> {
        io_result("rmdir", platform::rmdir(path))
    }

    fn unlink(&self, path: &str) -> BackendResult<()> {
        io_result("unlink", platform::unlink(path))
    }

    fn read_dir(&self, path: &str) -> BackendResult<Vec<DirEntry>> {
        io_result("read_dir", platform::read_dir(path))
    }

    fn copy_file(&self, src: &str, dest: &str) -> BackendResult<()> {
        io_result("copy_file", platform::copy_file(src, dest))
    }

    fn sendfile(
        &self,
        out_fd: RawFd,
        in_fd: RawFd,
        offset: u64,
        len: usize,
    ) -> BackendResult<usize> {
        io_result("sendfile", platform::sendfile(out_fd, in_fd, offset, len))
    }

    fn flock(&self, fd: RawFd, op: LockOp) -> BackendResult<()> {
        io_result("flock", platform::flock(fd, op))
    }

    fn setxattr(&self, path: &str, key: &str, value: &[u8]) -> BackendResult<()> {
        io_result("setxattr", platform::setxattr(path, key, value))
    }

    fn getxattr(&self, path: &str, key: &str) -> BackendResult<Vec<u8>> {
        io_result("getxattr", platform::getxattr(path, key))
    }
}
