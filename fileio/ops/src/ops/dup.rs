use fileio_core::{FileIoResult, RawFd};
use tracing::instrument;

use crate::{FileIo, FsFile, check, check_fd};

const PROC_SELF_FD: &str = "/proc/self/fd";

impl FileIo {
    /// Duplicate a descriptor into a new, independently owned [`FsFile`].
    ///
    /// The path of the new file is read back from `/proc/self/fd`; if that
    /// fails the duplicate is closed again.
    #[instrument(level = "debug", skip_all, fields(fd))]
    pub fn dup(&self, fd: RawFd) -> FileIoResult<FsFile> {
        let fd = check_fd("dup", fd)?;
        let new_fd = check("dup", self.backend.dup(fd))?;
        let guard = self.guard(new_fd)?;
        let path = check(
            "dup.readlink",
            self.backend.readlink(&format!("{PROC_SELF_FD}/{new_fd}")),
        )?;
        Ok(FsFile::new(guard, path))
    }
}
