//! Building blocks of the file-operation execution core: the error taxonomy,
//! path classification, descriptor ownership and the injected [`Backend`].

pub mod backend;
mod config;
pub mod errno;
mod error;
pub mod fd_guard;
pub mod filter;
pub mod flags;
pub mod path;
pub mod stat;
pub mod task_signal;

pub use backend::{Backend, BackendCode, BackendResult, RawFd, SeekWhence};
pub use config::FileIoConfig;
pub use error::{ConflictFiles, FileIoError, FileIoErrorKind, FileIoResult};
pub use fd_guard::FdGuard;
pub use filter::{FileFilter, ListFileOptions};
pub use flags::{AccessMode, LockOp, OpenMode};
pub use path::{PathCategory, ResolvedPath};
pub use stat::{DirEntry, DirEntryKind, FileStat};
pub use task_signal::{TaskSignal, TaskSignalListener};
