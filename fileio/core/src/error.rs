use std::borrow::Cow;
use std::fmt;

use crate::errno;

/// Stable application error kinds.
///
/// Every kind maps to a fixed numeric code and message through
/// [`FileIoErrorKind::code`] and [`FileIoErrorKind::message`]. Both are part of
/// the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileIoErrorKind {
    PermissionDenied,
    NotFound,
    NoSuchProcess,
    Interrupted,
    Io,
    NoDeviceOrAddress,
    ArgListTooLong,
    /// `EBADF` reported by the host.
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
    /// A guard or session whose descriptor was already released.
    ///
    /// Shares its numeric code with [`FileIoErrorKind::InvalidArgument`].
    BadDescriptor,
    PermissionVerification,
    InvalidParameter,
    Unsupported,
    OsUnsupported,
}

impl FileIoErrorKind {
    pub const fn code(self) -> u32 {
        use FileIoErrorKind::*;
        let suffix = match self {
            PermissionVerification => return 201,
            InvalidParameter => return 401,
            Unsupported => return 801,
            OsUnsupported => return 901,
            PermissionDenied => 1,
            NotFound => 2,
            NoSuchProcess => 3,
            Interrupted => 4,
            Io => 5,
            NoDeviceOrAddress => 6,
            ArgListTooLong => 7,
            BadFileNumber => 8,
            NoChildProcess => 9,
            TryAgain => 10,
            OutOfMemory => 11,
            AccessDenied => 12,
            BadAddress => 13,
            Busy => 14,
            AlreadyExists => 15,
            CrossDevice => 16,
            NoDevice => 17,
            NotDir => 18,
            IsDir => 19,
            InvalidArgument | BadDescriptor => 20,
            FileTableOverflow => 21,
            TooManyOpenFiles => 22,
            TextFileBusy => 23,
            FileTooLarge => 24,
            NoSpace => 25,
            IllegalSeek => 26,
            ReadOnlyFs => 27,
            TooManyLinks => 28,
            Deadlock => 29,
            NameTooLong => 30,
            NotImplemented => 31,
            DirNotEmpty => 32,
            TooManySymlinks => 33,
            WouldBlock => 34,
            BadRequest => 35,
            NotStream => 36,
            NoData => 37,
            Overflow => 38,
            BadFdState => 39,
            Restart => 40,
            QuotaExceeded => 41,
            Unknown => 42,
            NoLock => 43,
            NetworkUnreachable => 44,
            ConnectionFailed => 45,
            ConnectionAborted => 46,
            NoTask => 47,
            CancelFailed => 48,
            Cancelled => 49,
        };
        errno::ERRNO_BASE + suffix
    }

    pub const fn message(self) -> &'static str {
        use FileIoErrorKind::*;
        match self {
            PermissionDenied => "Operation not permitted",
            NotFound => "No such file or directory",
            NoSuchProcess => "No such process",
            Interrupted => "Interrupted system call",
            Io => "I/O error",
            NoDeviceOrAddress => "No such device or address",
            ArgListTooLong => "Arg list too long",
            BadFileNumber | BadDescriptor => "Bad file descriptor",
            NoChildProcess => "No child processes",
            TryAgain => "Try again",
            OutOfMemory => "Out of memory",
            AccessDenied => "Permission denied",
            BadAddress => "Bad address",
            Busy => "Device or resource busy",
            AlreadyExists => "File exists",
            CrossDevice => "Cross-device link",
            NoDevice => "No such device",
            NotDir => "Not a directory",
            IsDir => "Is a directory",
            InvalidArgument => "Invalid argument",
            FileTableOverflow => "File table overflow",
            TooManyOpenFiles => "Too many open files",
            TextFileBusy => "Text file busy",
            FileTooLarge => "File too large",
            NoSpace => "No space left on device",
            IllegalSeek => "Illegal seek",
            ReadOnlyFs => "Read-only file system",
            TooManyLinks => "Too many links",
            Deadlock => "Resource deadlock would occur",
            NameTooLong => "File name too long",
            NotImplemented => "Function not implemented",
            DirNotEmpty => "Directory not empty",
            TooManySymlinks => "Too many symbolic links encountered",
            WouldBlock => "Operation would block",
            BadRequest => "Invalid request descriptor",
            NotStream => "Device not a stream",
            NoData => "No data available",
            Overflow => "Value too large for defined data type",
            BadFdState => "File descriptor in bad state",
            Restart => "Interrupted system call should be restarted",
            QuotaExceeded => "Quota exceeded",
            Unknown => "Unknown error",
            NoLock => "No record locks available",
            NetworkUnreachable => "Network is unreachable",
            ConnectionFailed => "Connection failed",
            ConnectionAborted => "Software caused connection abort",
            NoTask => "No task can be canceled",
            CancelFailed => "Failed to cancel",
            Cancelled => "Operation canceled",
            PermissionVerification => "Permission verification failed",
            InvalidParameter => "The input parameter is invalid",
            Unsupported => "The device doesn't support this api",
            OsUnsupported => "The os doesn't support this api",
        }
    }
}

impl fmt::Display for FileIoErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A source/destination pair that could not be applied by a batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictFiles {
    pub src: String,
    pub dest: String,
}

impl ConflictFiles {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{context}: {message} ({})", .kind.code())]
pub struct FileIoError {
    kind: FileIoErrorKind,
    context: &'static str,
    message: Cow<'static, str>,
    conflicts: Vec<ConflictFiles>,
}

pub type FileIoResult<T> = Result<T, FileIoError>;

impl FileIoError {
    pub fn new(kind: FileIoErrorKind, context: &'static str) -> Self {
        Self {
            kind,
            context,
            message: Cow::Borrowed(kind.message()),
            conflicts: Vec::new(),
        }
    }

    pub fn invalid_argument(context: &'static str) -> Self {
        Self::new(FileIoErrorKind::InvalidArgument, context)
    }

    pub fn bad_descriptor(context: &'static str) -> Self {
        Self::new(FileIoErrorKind::BadDescriptor, context)
    }

    /// Translate a native code (backend convention or errno) into an error.
    ///
    /// A failure carrying code 0 has no errno to report and becomes
    /// [`FileIoErrorKind::Io`].
    pub fn from_native(context: &'static str, native: i32) -> Self {
        let (kind, message) = match errno::translate(native) {
            Some(translated) => translated,
            None => {
                let kind = FileIoErrorKind::Io;
                (kind, Cow::Borrowed(kind.message()))
            }
        };
        Self {
            kind,
            context,
            message,
            conflicts: Vec::new(),
        }
    }

    pub fn with_conflicts(mut self, conflicts: Vec<ConflictFiles>) -> Self {
        self.conflicts = conflicts;
        self
    }

    pub fn kind(&self) -> FileIoErrorKind {
        self.kind
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &'static str {
        self.context
    }

    pub fn conflicts(&self) -> &[ConflictFiles] {
        &self.conflicts
    }
}
