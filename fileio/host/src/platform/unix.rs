use std::ffi::{CStr, CString};
use std::io;
use std::mem;
use std::os::raw::c_char;

use fileio_core::flags::{AccessMode, LockOp, OpenMode};
use fileio_core::stat::{DirEntry, DirEntryKind, FileStat};
use fileio_core::{RawFd, SeekWhence};

fn cstring(path: &str) -> io::Result<CString> {
    CString::new(path.as_bytes())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
}

fn check(res: libc::c_int) -> io::Result<()> {
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn check_len(res: libc::ssize_t) -> io::Result<usize> {
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as usize)
}

fn open_flags(mode: OpenMode) -> libc::c_int {
    let mut oflags = libc::O_CLOEXEC;
    oflags |= if mode.contains(OpenMode::READ_WRITE) {
        libc::O_RDWR
    } else if mode.contains(OpenMode::WRITE_ONLY) {
        libc::O_WRONLY
    } else {
        libc::O_RDONLY
    };
    if mode.contains(OpenMode::CREATE) {
        oflags |= libc::O_CREAT;
    }
    if mode.contains(OpenMode::TRUNC) {
        oflags |= libc::O_TRUNC;
    }
    if mode.contains(OpenMode::APPEND) {
        oflags |= libc::O_APPEND;
    }
    if mode.contains(OpenMode::NONBLOCK) {
        oflags |= libc::O_NONBLOCK;
    }
    if mode.contains(OpenMode::DIRECTORY) {
        oflags |= libc::O_DIRECTORY;
    }
    if mode.contains(OpenMode::NOFOLLOW) {
        oflags |= libc::O_NOFOLLOW;
    }
    if mode.contains(OpenMode::SYNC) {
        oflags |= libc::O_SYNC;
    }
    oflags
}

pub fn open(path: &str, mode: OpenMode, perm: u32) -> io::Result<RawFd> {
    let cstr = cstring(path)?;
    let fd = unsafe { libc::open(cstr.as_ptr(), open_flags(mode), perm as libc::c_uint) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(fd)
}

pub fn close(fd: RawFd) -> io::Result<()> {
    check(unsafe { libc::close(fd) })
}

pub fn read(fd: RawFd, buf: &mut [u8], offset: Option<u64>) -> io::Result<usize> {
    let ptr = buf.as_mut_ptr() as *mut libc::c_void;
    let res = match offset {
        Some(offset) => unsafe { libc::pread(fd, ptr, buf.len(), offset as libc::off_t) },
        None => unsafe { libc::read(fd, ptr, buf.len()) },
    };
    check_len(res)
}

pub fn write(fd: RawFd, buf: &[u8], offset: Option<u64>) -> io::Result<usize> {
    let ptr = buf.as_ptr() as *const libc::c_void;
    let res = match offset {
        Some(offset) => unsafe { libc::pwrite(fd, ptr, buf.len(), offset as libc::off_t) },
        None => unsafe { libc::write(fd, ptr, buf.len()) },
    };
    check_len(res)
}

pub fn lseek(fd: RawFd, offset: i64, whence: SeekWhence) -> io::Result<u64> {
    let whence = match whence {
        SeekWhence::Start => libc::SEEK_SET,
        SeekWhence::Current => libc::SEEK_CUR,
        SeekWhence::End => libc::SEEK_END,
    };
    let res = unsafe { libc::lseek(fd, offset as libc::off_t, whence) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as u64)
}

pub fn stat(path: &str) -> io::Result<FileStat> {
    let cstr = cstring(path)?;
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    check(unsafe { libc::stat(cstr.as_ptr(), &mut st) })?;
    Ok(stat_from_libc(&st))
}

pub fn lstat(path: &str) -> io::Result<FileStat> {
    let cstr = cstring(path)?;
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    check(unsafe { libc::lstat(cstr.as_ptr(), &mut st) })?;
    Ok(stat_from_libc(&st))
}

pub fn fstat(fd: RawFd) -> io::Result<FileStat> {
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    check(unsafe { libc::fstat(fd, &mut st) })?;
    Ok(stat_from_libc(&st))
}

pub fn rename(from: &str, to: &str) -> io::Result<()> {
    let from = cstring(from)?;
    let to = cstring(to)?;
    check(unsafe { libc::rename(from.as_ptr(), to.as_ptr()) })
}

pub fn symlink(target: &str, link: &str) -> io::Result<()> {
    let target = cstring(target)?;
    let link = cstring(link)?;
    check(unsafe { libc::symlink(target.as_ptr(), link.as_ptr()) })
}

pub fn ftruncate(fd: RawFd, len: u64) -> io::Result<()> {
    check(unsafe { libc::ftruncate(fd, len as libc::off_t) })
}

pub fn fsync(fd: RawFd) -> io::Result<()> {
    check(unsafe { libc::fsync(fd) })
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn fdatasync(fd: RawFd) -> io::Result<()> {
    check(unsafe { libc::fdatasync(fd) })
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn fdatasync(fd: RawFd) -> io::Result<()> {
    fsync(fd)
}

pub fn dup(fd: RawFd) -> io::Result<RawFd> {
    let res = unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res)
}

pub fn readlink(path: &str) -> io::Result<String> {
    let cstr = cstring(path)?;
    let mut buf = vec![0u8; 1024];
    loop {
        let out = buf.as_mut_ptr() as *mut c_char;
        let res = unsafe { libc::readlink(cstr.as_ptr(), out, buf.len()) };
        let len = check_len(res)?;
        if len < buf.len() {
            buf.truncate(len);
            return Ok(String::from_utf8_lossy(&buf).into_owned());
        }
        buf.resize(buf.len() * 2, 0);
    }
}

pub fn realpath(path: &str) -> io::Result<String> {
    let cstr = cstring(path)?;
    let resolved = unsafe { libc::realpath(cstr.as_ptr(), std::ptr::null_mut()) };
    if resolved.is_null() {
        return Err(io::Error::last_os_error());
    }
    let out = unsafe { CStr::from_ptr(resolved) }
        .to_string_lossy()
        .into_owned();
    unsafe { libc::free(resolved as *mut libc::c_void) };
    Ok(out)
}

pub fn utime(path: &str, atime_ns: i64, mtime_ns: i64) -> io::Result<()> {
    let cstr = cstring(path)?;
    let times = [make_timespec(atime_ns), make_timespec(mtime_ns)];
    let res = unsafe { libc::utimensat(libc::AT_FDCWD, cstr.as_ptr(), times.as_ptr(), 0) };
    check(res)
}

fn make_timespec(ns: i64) -> libc::timespec {
    libc::timespec {
        tv_sec: ns.div_euclid(1_000_000_000) as libc::time_t,
        tv_nsec: ns.rem_euclid(1_000_000_000) as _,
    }
}

pub fn mkdtemp(template: &str) -> io::Result<String> {
    let mut buf = cstring(template)?.into_bytes_with_nul();
    let res = unsafe { libc::mkdtemp(buf.as_mut_ptr() as *mut c_char) };
    if res.is_null() {
        return Err(io::Error::last_os_error());
    }
    buf.pop();
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn access(path: &str, mode: AccessMode) -> io::Result<()> {
    let cstr = cstring(path)?;
    let mut amode = libc::F_OK;
    if mode.contains(AccessMode::READ) {
        amode |= libc::R_OK;
    }
    if mode.contains(AccessMode::WRITE) {
        amode |= libc::W_OK;
    }
    check(unsafe { libc::access(cstr.as_ptr(), amode) })
}

pub fn mkdir(path: &str, perm: u32) -> io::Result<()> {
    let cstr = cstring(path)?;
    check(unsafe { libc::mkdir(cstr.as_ptr(), perm as libc::mode_t) })
}

pub fn rmdir(path: &str) -> io::Result<()> {
    let cstr = cstring(path)?;
    check(unsafe { libc::rmdir(cstr.as_ptr()) })
}

pub fn unlink(path: &str) -> io::Result<()> {
    let cstr = cstring(path)?;
    check(unsafe { libc::unlink(cstr.as_ptr()) })
}

pub fn read_dir(path: &str) -> io::Result<Vec<DirEntry>> {
    let cstr = cstring(path)?;
    let dirp = unsafe { libc::opendir(cstr.as_ptr()) };
    if dirp.is_null() {
        return Err(io::Error::last_os_error());
    }

    let mut entries = Vec::new();
    loop {
        set_errno(0);
        let ent = unsafe { libc::readdir(dirp) };
        if ent.is_null() {
            let err = errno();
            unsafe { libc::closedir(dirp) };
            if err == 0 {
                break;
            }
            return Err(io::Error::from_raw_os_error(err));
        }
        let name = unsafe { CStr::from_ptr((*ent).d_name.as_ptr()) }
            .to_string_lossy()
            .into_owned();
        if name == "." || name == ".." {
            continue;
        }
        let kind = match unsafe { (*ent).d_type } {
            libc::DT_REG => DirEntryKind::File,
            libc::DT_DIR => DirEntryKind::Directory,
            libc::DT_LNK => DirEntryKind::Symlink,
            libc::DT_UNKNOWN => lstat(&format!("{path}/{name}"))
                .map(|st| kind_from_stat(&st))
                .unwrap_or(DirEntryKind::Other),
            _ => DirEntryKind::Other,
        };
        entries.push(DirEntry { name, kind });
    }
    Ok(entries)
}

fn kind_from_stat(stat: &FileStat) -> DirEntryKind {
    if stat.is_file() {
        DirEntryKind::File
    } else if stat.is_directory() {
        DirEntryKind::Directory
    } else if stat.is_symbolic_link() {
        DirEntryKind::Symlink
    } else {
        DirEntryKind::Other
    }
}

pub fn copy_file(src: &str, dest: &str) -> io::Result<()> {
    std::fs::copy(src, dest).map(|_| ())
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn sendfile(out_fd: RawFd, in_fd: RawFd, offset: u64, len: usize) -> io::Result<usize> {
    let mut off = offset as libc::off_t;
    check_len(unsafe { libc::sendfile(out_fd, in_fd, &mut off, len) })
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn sendfile(out_fd: RawFd, in_fd: RawFd, offset: u64, len: usize) -> io::Result<usize> {
    let mut buf = vec![0u8; len.min(64 * 1024)];
    let read = read(in_fd, &mut buf, Some(offset))?;
    write(out_fd, &buf[..read], None)
}

pub fn flock(fd: RawFd, op: LockOp) -> io::Result<()> {
    let op = match op {
        LockOp::Shared => libc::LOCK_SH,
        LockOp::Exclusive => libc::LOCK_EX,
        LockOp::SharedNonBlocking => libc::LOCK_SH | libc::LOCK_NB,
        LockOp::ExclusiveNonBlocking => libc::LOCK_EX | libc::LOCK_NB,
        LockOp::Unlock => libc::LOCK_UN,
    };
    check(unsafe { libc::flock(fd, op) })
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn setxattr(path: &str, key: &str, value: &[u8]) -> io::Result<()> {
    let path = cstring(path)?;
    let key = cstring(key)?;
    check(unsafe {
        libc::setxattr(
            path.as_ptr(),
            key.as_ptr(),
            value.as_ptr() as *const libc::c_void,
            value.len(),
            0,
        )
    })
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn getxattr(path: &str, key: &str) -> io::Result<Vec<u8>> {
    let path = cstring(path)?;
    let key = cstring(key)?;
    read_xattr(|buf, len| unsafe {
        libc::getxattr(path.as_ptr(), key.as_ptr(), buf, len)
    })
}

#[cfg(target_os = "macos")]
pub fn setxattr(path: &str, key: &str, value: &[u8]) -> io::Result<()> {
    let path = cstring(path)?;
    let key = cstring(key)?;
    check(unsafe {
        libc::setxattr(
            path.as_ptr(),
            key.as_ptr(),
            value.as_ptr() as *const libc::c_void,
            value.len(),
            0,
            0,
        )
    })
}

#[cfg(target_os = "macos")]
pub fn getxattr(path: &str, key: &str) -> io::Result<Vec<u8>> {
    let path = cstring(path)?;
    let key = cstring(key)?;
    read_xattr(|buf, len| unsafe {
        libc::getxattr(path.as_ptr(), key.as_ptr(), buf, len, 0, 0)
    })
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
pub fn setxattr(_path: &str, _key: &str, _value: &[u8]) -> io::Result<()> {
    Err(io::Error::from_raw_os_error(libc::ENOTSUP))
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
pub fn getxattr(_path: &str, _key: &str) -> io::Result<Vec<u8>> {
    Err(io::Error::from_raw_os_error(libc::ENOTSUP))
}

/// Size query first, then the value. A missing or empty attribute is `[]`.
#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
fn read_xattr(
    mut call: impl FnMut(*mut libc::c_void, usize) -> libc::ssize_t,
) -> io::Result<Vec<u8>> {
    let size = call(std::ptr::null_mut(), 0);
    if size <= 0 {
        return Ok(Vec::new());
    }
    let mut buf = vec![0u8; size as usize];
    let read = check_len(call(buf.as_mut_ptr() as *mut libc::c_void, buf.len()))?;
    buf.truncate(read);
    Ok(buf)
}

fn stat_from_libc(st: &libc::stat) -> FileStat {
    let (atime_ns, mtime_ns, ctime_ns) = stat_times(st);
    FileStat {
        ino: st.st_ino as u64,
        mode: st.st_mode as u32,
        uid: st.st_uid,
        gid: st.st_gid,
        size: st.st_size as u64,
        atime_ns,
        mtime_ns,
        ctime_ns,
    }
}

fn to_ns(secs: i64, nanos: i64) -> i64 {
    secs.saturating_mul(1_000_000_000).saturating_add(nanos)
}

fn stat_times(st: &libc::stat) -> (i64, i64, i64) {
    (
        to_ns(st.st_atime as i64, st.st_atime_nsec as i64),
        to_ns(st.st_mtime as i64, st.st_mtime_nsec as i64),
        to_ns(st.st_ctime as i64, st.st_ctime_nsec as i64),
    )
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn errno() -> i32 {
    unsafe { *libc::__errno_location() }
}

#[cfg(target_os = "macos")]
fn errno() -> i32 {
    unsafe { *libc::__error() }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn set_errno(val: i32) {
    unsafe {
        *libc::__errno_location() = val;
    }
}

#[cfg(target_os = "macos")]
fn set_errno(val: i32) {
    unsafe {
        *libc::__error() = val;
    }
}
