//! One module per family of dispatcher operations. Every module only adds
//! methods to [`FileIo`](crate::FileIo).

mod access;
mod copy_file;
mod dir;
mod dup;
mod list_file;
mod lseek;
mod move_file;
mod open;
mod read_text;
mod read_write;
mod rename;
mod stat;
mod sync;
mod truncate;
mod utimes;
mod xattr;

pub use self::move_file::{MOVE_FILE_FORCE, MOVE_FILE_THROW};
pub use self::read_text::ReadTextOptions;
pub use self::read_write::{ReadOptions, WriteOptions};
pub(crate) use self::read_write::{positional, transfer_len};
pub use self::xattr::XATTR_MAX_LEN;

/// Permission bits used for files created by the dispatcher.
pub(crate) const CREATE_PERM: u32 = 0o660;
/// Permission bits used for directories created by the dispatcher.
pub(crate) const DIR_PERM: u32 = 0o775;

/// Join a directory and an entry name with exactly one separator.
pub(crate) fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
