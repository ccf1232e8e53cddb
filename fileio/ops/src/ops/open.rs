use fileio_core::{FileIoError, FileIoResult, OpenMode};
use tracing::instrument;

use super::CREATE_PERM;
use crate::{FileInfo, FileIo, FsFile, check, check_fd};

impl FileIo {
    /// ### `open()`
    /// Open a path or URI.
    ///
    /// Inputs:
    /// - `path`
    ///     A plain path, a sandbox path or a resolvable URI
    /// - `mode`
    ///     Raw [`OpenMode`] bits; unknown bits are rejected before any backend call
    ///
    /// Output:
    /// - An [`FsFile`] owning the new descriptor
    #[instrument(level = "debug", skip_all, fields(%path, mode))]
    pub fn open(&self, path: &str, mode: i64) -> FileIoResult<FsFile> {
        let mode = OpenMode::from_raw(mode)?;
        let resolved = self.resolve(path)?;
        let fd = check(
            "open",
            self.backend.open(&resolved.real_path, mode, CREATE_PERM),
        )?;
        let guard = self.guard(fd)?;
        let display = match resolved.uri {
            Some(uri) => uri,
            None => self
                .backend
                .realpath(&resolved.real_path)
                .unwrap_or(resolved.real_path),
        };
        Ok(FsFile::new(guard, display))
    }

    /// Close a raw descriptor. Closing by path is not possible.
    #[instrument(level = "debug", skip_all, fields(?file))]
    pub fn close(&self, file: FileInfo) -> FileIoResult<()> {
        let fd = match file {
            FileInfo::Path(_) => return Err(FileIoError::invalid_argument("close.path")),
            FileInfo::Fd(fd) => check_fd("close", fd)?,
        };
        check("close", self.backend.close(fd))
    }
}
