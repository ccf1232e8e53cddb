use fileio_core::{FileIoError, FileIoErrorKind, FileIoResult, RawFd, SeekWhence};
use tracing::instrument;

use crate::{FileIo, check, check_fd};

impl FileIo {
    /// Reposition a descriptor and return the new absolute position.
    ///
    /// `whence` is `0` (start), `1` (current) or `2` (end). Seeking relative to
    /// the current position is rejected with
    /// [`FileIoErrorKind::IllegalSeek`] whatever the offset.
    #[instrument(level = "debug", skip_all, fields(fd, offset, whence))]
    pub fn lseek(&self, fd: RawFd, offset: i64, whence: i32) -> FileIoResult<u64> {
        let fd = check_fd("lseek", fd)?;
        let whence = SeekWhence::try_from(whence)
            .map_err(|_| FileIoError::invalid_argument("lseek.whence"))?;
        if whence == SeekWhence::Current {
            return Err(FileIoError::new(
                FileIoErrorKind::IllegalSeek,
                "lseek.whence",
            ));
        }
        check("lseek", self.backend.lseek(fd, offset, whence))
    }
}
