use fileio_core::{FileIoError, FileIoResult, FileStat};
use tracing::instrument;

use crate::{FileInfo, FileIo, check};

impl FileIo {
    /// Stat a path (following symlinks) or a descriptor.
    #[instrument(level = "debug", skip_all, fields(?file))]
    pub fn stat(&self, file: &FileInfo) -> FileIoResult<FileStat> {
        match file {
            FileInfo::Path(path) => {
                let resolved = self.resolve(path)?;
                check("stat", self.backend.stat(&resolved.real_path))
            }
            FileInfo::Fd(fd) if *fd >= 0 => check("stat.fstat", self.backend.fstat(*fd)),
            FileInfo::Fd(_) => Err(FileIoError::invalid_argument("stat.fd")),
        }
    }

    /// Stat a path without following a trailing symlink.
    #[instrument(level = "debug", skip_all, fields(%path))]
    pub fn lstat(&self, path: &str) -> FileIoResult<FileStat> {
        let resolved = self.resolve(path)?;
        check("lstat", self.backend.lstat(&resolved.real_path))
    }
}
