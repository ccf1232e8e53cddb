//! Native error code → application error translation.
//!
//! This is the single source of truth for mapping host and backend error
//! codes to [`FileIoErrorKind`]. Callers must not duplicate this mapping.
//!
//! Lookup order:
//! 1. a negative code is a backend code (`-errno`); it is accepted only when it
//!    names a known backend symbol,
//! 2. the normalized errno is looked up in the generic table,
//! 3. anything left over is [`FileIoErrorKind::Unknown`].

use std::borrow::Cow;

use crate::FileIoErrorKind;

/// Offset added to every errno-derived application code.
pub const ERRNO_BASE: u32 = 13_900_000;

/// Translate a native code into an error kind and its message.
///
/// An errno of 0 is "no error" and yields `None`. Codes that are already
/// application codes map to themselves. Unmapped codes produce
/// [`FileIoErrorKind::Unknown`] with the errno in the message.
pub fn translate(native: i32) -> Option<(FileIoErrorKind, Cow<'static, str>)> {
    if native == 0 {
        return None;
    }
    if let Some(kind) = kind_for_native(native) {
        return Some((kind, Cow::Borrowed(kind.message())));
    }
    Some((
        FileIoErrorKind::Unknown,
        Cow::Owned(format!("Unknown error, errno is {native}")),
    ))
}

/// Resolve a native code to an error kind, if it is known.
pub fn kind_for_native(native: i32) -> Option<FileIoErrorKind> {
    if native < 0 {
        let errno = native.checked_neg()?;
        errno_symbol(errno)?;
        return errno_to_kind(errno);
    }
    if let Some(kind) = application_code_to_kind(native as u32) {
        return Some(kind);
    }
    errno_to_kind(native)
}

fn application_code_to_kind(code: u32) -> Option<FileIoErrorKind> {
    use FileIoErrorKind::*;
    let kind = match code {
        201 => PermissionVerification,
        401 => InvalidParameter,
        801 => Unsupported,
        901 => OsUnsupported,
        c if c > ERRNO_BASE && c <= ERRNO_BASE + 49 => {
            return suffix_to_kind(c - ERRNO_BASE);
        }
        _ => return None,
    };
    Some(kind)
}

fn suffix_to_kind(suffix: u32) -> Option<FileIoErrorKind> {
    use FileIoErrorKind::*;
    const BY_SUFFIX: [FileIoErrorKind; 49] = [
        PermissionDenied,
        NotFound,
        NoSuchProcess,
        Interrupted,
        Io,
        NoDeviceOrAddress,
        ArgListTooLong,
        BadFileNumber,
        NoChildProcess,
        TryAgain,
        OutOfMemory,
        AccessDenied,
        BadAddress,
        Busy,
        AlreadyExists,
        CrossDevice,
        NoDevice,
        NotDir,
        IsDir,
        InvalidArgument,
        FileTableOverflow,
        TooManyOpenFiles,
        TextFileBusy,
        FileTooLarge,
        NoSpace,
        IllegalSeek,
        ReadOnlyFs,
        TooManyLinks,
        Deadlock,
        NameTooLong,
        NotImplemented,
        DirNotEmpty,
        TooManySymlinks,
        WouldBlock,
        BadRequest,
        NotStream,
        NoData,
        Overflow,
        BadFdState,
        Restart,
        QuotaExceeded,
        Unknown,
        NoLock,
        NetworkUnreachable,
        ConnectionFailed,
        ConnectionAborted,
        NoTask,
        CancelFailed,
        Cancelled,
    ];
    BY_SUFFIX.get(suffix.checked_sub(1)? as usize).copied()
}

/// Map a positive errno to an error kind.
pub fn errno_to_kind(errno: i32) -> Option<FileIoErrorKind> {
    use FileIoErrorKind::*;
    let kind = match errno {
        libc::EPERM => PermissionDenied,
        libc::ENOENT => NotFound,
        libc::ESRCH => NoSuchProcess,
        libc::EINTR => Interrupted,
        libc::EIO => Io,
        libc::ENXIO => NoDeviceOrAddress,
        libc::E2BIG => ArgListTooLong,
        libc::EBADF => BadFileNumber,
        libc::ECHILD => NoChildProcess,
        libc::EAGAIN => TryAgain,
        libc::ENOMEM => OutOfMemory,
        libc::EACCES => AccessDenied,
        libc::EFAULT => BadAddress,
        libc::EBUSY => Busy,
        libc::EEXIST => AlreadyExists,
        libc::EXDEV => CrossDevice,
        libc::ENODEV => NoDevice,
        libc::ENOTDIR => NotDir,
        libc::EISDIR => IsDir,
        libc::EINVAL => InvalidArgument,
        libc::ENFILE => FileTableOverflow,
        libc::EMFILE => TooManyOpenFiles,
        libc::ETXTBSY => TextFileBusy,
        libc::EFBIG => FileTooLarge,
        libc::ENOSPC => NoSpace,
        libc::ESPIPE => IllegalSeek,
        libc::EROFS => ReadOnlyFs,
        libc::EMLINK => TooManyLinks,
        libc::EDEADLK => Deadlock,
        libc::ENAMETOOLONG => NameTooLong,
        libc::ENOSYS => NotImplemented,
        libc::ENOTEMPTY => DirNotEmpty,
        libc::ELOOP => TooManySymlinks,
        libc::EOVERFLOW => Overflow,
        libc::EDQUOT => QuotaExceeded,
        libc::ENOLCK => NoLock,
        libc::ENETUNREACH => NetworkUnreachable,
        libc::ECANCELED => Cancelled,
        other => return platform_errno_to_kind(other),
    };
    Some(kind)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn platform_errno_to_kind(errno: i32) -> Option<FileIoErrorKind> {
    use FileIoErrorKind::*;
    let kind = match errno {
        libc::EBADR => BadRequest,
        libc::ENOSTR => NotStream,
        libc::ENODATA => NoData,
        libc::EBADFD => BadFdState,
        libc::ERESTART => Restart,
        _ => return None,
    };
    Some(kind)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn platform_errno_to_kind(errno: i32) -> Option<FileIoErrorKind> {
    match errno {
        libc::ENODATA => Some(FileIoErrorKind::NoData),
        _ => None,
    }
}

/// Stable symbolic name for an errno (logging only).
pub fn errno_symbol(errno: i32) -> Option<&'static str> {
    let name = match errno {
        libc::EPERM => "EPERM",
        libc::ENOENT => "ENOENT",
        libc::ESRCH => "ESRCH",
        libc::EINTR => "EINTR",
        libc::EIO => "EIO",
        libc::ENXIO => "ENXIO",
        libc::E2BIG => "E2BIG",
        libc::EBADF => "EBADF",
        libc::ECHILD => "ECHILD",
        libc::EAGAIN => "EAGAIN",
        libc::ENOMEM => "ENOMEM",
        libc::EACCES => "EACCES",
        libc::EFAULT => "EFAULT",
        libc::EBUSY => "EBUSY",
        libc::EEXIST => "EEXIST",
        libc::EXDEV => "EXDEV",
        libc::ENODEV => "ENODEV",
        libc::ENOTDIR => "ENOTDIR",
        libc::EISDIR => "EISDIR",
        libc::EINVAL => "EINVAL",
        libc::ENFILE => "ENFILE",
        libc::EMFILE => "EMFILE",
        libc::ETXTBSY => "ETXTBSY",
        libc::EFBIG => "EFBIG",
        libc::ENOSPC => "ENOSPC",
        libc::ESPIPE => "ESPIPE",
        libc::EROFS => "EROFS",
        libc::EMLINK => "EMLINK",
        libc::EDEADLK => "EDEADLK",
        libc::ENAMETOOLONG => "ENAMETOOLONG",
        libc::ENOSYS => "ENOSYS",
        libc::ENOTEMPTY => "ENOTEMPTY",
        libc::ELOOP => "ELOOP",
        libc::EOVERFLOW => "EOVERFLOW",
        libc::EDQUOT => "EDQUOT",
        libc::ENOLCK => "ENOLCK",
        libc::ENETUNREACH => "ENETUNREACH",
        libc::ECANCELED => "ECANCELED",
        libc::ENODATA => "ENODATA",
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::EBADR => "EBADR",
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::ENOSTR => "ENOSTR",
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::EBADFD => "EBADFD",
        #[cfg(any(target_os = "linux", target_os = "android"))]
        libc::ERESTART => "ERESTART",
        _ => return None,
    };
    Some(name)
}
