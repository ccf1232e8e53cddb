use fileio_core::{FdGuard, FileIoError, FileIoErrorKind, FileIoResult, OpenMode, SeekWhence};
use tracing::instrument;

use super::CREATE_PERM;
use crate::{FileInfo, FileIo, check, check_fd};

impl FileIo {
    /// Copy a file. Either side may be a path or a descriptor.
    ///
    /// Path to path copies go through [`Backend::copy_file`](fileio_core::Backend::copy_file).
    /// Anything involving a descriptor streams the source with `sendfile`,
    /// in chunks of at most [`FileIoConfig::copy_chunk_size`](fileio_core::FileIoConfig)
    /// bytes. Only `mode == 0` is supported.
    #[instrument(level = "debug", skip_all, fields(?src, ?dest, mode))]
    pub fn copy_file(&self, src: &FileInfo, dest: &FileInfo, mode: i32) -> FileIoResult<()> {
        if mode != 0 {
            return Err(FileIoError::invalid_argument("copy_file.mode"));
        }
        if let (FileInfo::Path(src), FileInfo::Path(dest)) = (src, dest) {
            return self.copy_path_to_path(src, dest);
        }

        let input = self.copy_source(src)?;
        let size = check("copy_file.fstat", self.backend.fstat(input.fd()?))?.size;
        let output = self.copy_dest(dest)?;
        self.send_all(&input, &output, size)
    }

    pub(crate) fn copy_path_to_path(&self, src: &str, dest: &str) -> FileIoResult<()> {
        if src.is_empty() || dest.is_empty() {
            return Err(FileIoError::new(
                FileIoErrorKind::NotFound,
                "copy_file.path",
            ));
        }
        let src = self.resolve(src)?;
        let dest = self.resolve(dest)?;
        check(
            "copy_file",
            self.backend.copy_file(&src.real_path, &dest.real_path),
        )
    }

    fn copy_source(&self, src: &FileInfo) -> FileIoResult<FdGuard> {
        match src {
            FileInfo::Path(path) => {
                let resolved = self.resolve(path)?;
                let fd = check(
                    "copy_file.open_src",
                    self.backend
                        .open(&resolved.real_path, OpenMode::READ_ONLY, 0),
                )?;
                self.guard(fd)
            }
            FileInfo::Fd(fd) => {
                FdGuard::borrowed(self.backend.clone(), check_fd("copy_file.src", *fd)?)
            }
        }
    }

    fn copy_dest(&self, dest: &FileInfo) -> FileIoResult<FdGuard> {
        match dest {
            FileInfo::Path(path) => {
                let resolved = self.resolve(path)?;
                let fd = check(
                    "copy_file.open_dest",
                    self.backend.open(
                        &resolved.real_path,
                        OpenMode::READ_WRITE | OpenMode::CREATE | OpenMode::TRUNC,
                        CREATE_PERM,
                    ),
                )?;
                self.guard(fd)
            }
            FileInfo::Fd(fd) => {
                let fd = check_fd("copy_file.dest", *fd)?;
                check("copy_file.ftruncate", self.backend.ftruncate(fd, 0))?;
                check(
                    "copy_file.lseek",
                    self.backend.lseek(fd, 0, SeekWhence::Start),
                )?;
                FdGuard::borrowed(self.backend.clone(), fd)
            }
        }
    }

    fn send_all(&self, input: &FdGuard, output: &FdGuard, size: u64) -> FileIoResult<()> {
        let (in_fd, out_fd) = (input.fd()?, output.fd()?);
        let chunk = self.config.copy_chunk_size.max(1) as u64;
        let mut offset = 0u64;
        while offset < size {
            let len = (size - offset).min(chunk) as usize;
            let sent = check(
                "copy_file.sendfile",
                self.backend.sendfile(out_fd, in_fd, offset, len),
            )?;
            if sent == 0 {
                tracing::error!(offset, size, "source ended before its reported size");
                return Err(FileIoError::new(FileIoErrorKind::Io, "copy_file.sendfile"));
            }
            offset += sent as u64;
        }
        Ok(())
    }
}
