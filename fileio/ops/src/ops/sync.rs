use fileio_core::{FileIoResult, RawFd};
use tracing::instrument;

use crate::{FileIo, check, check_fd};

impl FileIo {
    #[instrument(level = "debug", skip_all, fields(fd))]
    pub fn fsync(&self, fd: RawFd) -> FileIoResult<()> {
        let fd = check_fd("fsync", fd)?;
        check("fsync", self.backend.fsync(fd))
    }

    /// Like [`FileIo::fsync`] but metadata that is not needed to read the
    /// data back may stay unsynchronized.
    #[instrument(level = "debug", skip_all, fields(fd))]
    pub fn fdatasync(&self, fd: RawFd) -> FileIoResult<()> {
        let fd = check_fd("fdatasync", fd)?;
        check("fdatasync", self.backend.fdatasync(fd))
    }
}
