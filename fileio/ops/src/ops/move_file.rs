use fileio_core::{AccessMode, FileIoError, FileIoErrorKind, FileIoResult};
use tracing::instrument;

use crate::{FileIo, check};

/// Replace an existing destination.
pub const MOVE_FILE_FORCE: i32 = 0;
/// Fail when the destination exists.
pub const MOVE_FILE_THROW: i32 = 1;

impl FileIo {
    /// Move a regular file, copying across devices when renaming is not possible.
    #[instrument(level = "debug", skip_all, fields(%src, %dest, mode))]
    pub fn move_file(&self, src: &str, dest: &str, mode: i32) -> FileIoResult<()> {
        if mode != MOVE_FILE_FORCE && mode != MOVE_FILE_THROW {
            return Err(FileIoError::invalid_argument("move_file.mode"));
        }
        let src = self.resolve(src)?;
        let dest = self.resolve(dest)?;

        let src_stat = check("move_file.stat_src", self.backend.stat(&src.real_path))?;
        if src_stat.is_directory() {
            return Err(FileIoError::new(FileIoErrorKind::IsDir, "move_file.src"));
        }
        check(
            "move_file.access",
            self.backend.access(&src.real_path, AccessMode::WRITE),
        )?;
        match self.backend.stat(&dest.real_path) {
            Ok(stat) if stat.is_directory() => {
                return Err(FileIoError::new(FileIoErrorKind::IsDir, "move_file.dest"));
            }
            Ok(_) if mode == MOVE_FILE_THROW => {
                return Err(FileIoError::new(
                    FileIoErrorKind::AlreadyExists,
                    "move_file.dest",
                ));
            }
            _ => {}
        }

        self.rename_or_copy(&src.real_path, &dest.real_path)
    }

    /// Rename `src` onto `dest`; across devices, copy and unlink instead.
    pub(crate) fn rename_or_copy(&self, src: &str, dest: &str) -> FileIoResult<()> {
        match self.backend.rename(src, dest) {
            Ok(()) => Ok(()),
            Err(code) if code.is(libc::EXDEV) => {
                tracing::debug!(src, dest, "cross-device move, copying instead");
                check("move_file.copy", self.backend.copy_file(src, dest))?;
                check("move_file.unlink", self.backend.unlink(src))
            }
            Err(code) => check("move_file.rename", Err(code)),
        }
    }
}
