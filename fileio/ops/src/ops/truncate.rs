use fileio_core::{FileIoError, FileIoResult, OpenMode};
use tracing::instrument;

use super::CREATE_PERM;
use crate::{FileInfo, FileIo, check};

impl FileIo {
    /// Truncate (or extend) a file to `len` bytes, `0` by default.
    ///
    /// A path target is opened read-write first; a failure of that step is
    /// reported with context `truncate.open`, distinct from
    /// `truncate.ftruncate`.
    #[instrument(level = "debug", skip_all, fields(?file, ?len))]
    pub fn truncate(&self, file: &FileInfo, len: Option<i64>) -> FileIoResult<()> {
        let len = u64::try_from(len.unwrap_or(0))
            .map_err(|_| FileIoError::invalid_argument("truncate.len"))?;
        match file {
            FileInfo::Path(path) => {
                let resolved = self.resolve(path)?;
                let fd = check(
                    "truncate.open",
                    self.backend
                        .open(&resolved.real_path, OpenMode::READ_WRITE, CREATE_PERM),
                )?;
                let guard = self.guard(fd)?;
                check(
                    "truncate.ftruncate",
                    self.backend.ftruncate(guard.fd()?, len),
                )
            }
            FileInfo::Fd(fd) if *fd >= 0 => {
                check("truncate.ftruncate", self.backend.ftruncate(*fd, len))
            }
            FileInfo::Fd(_) => Err(FileIoError::invalid_argument("truncate.fd")),
        }
    }
}
