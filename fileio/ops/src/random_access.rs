//! Random-access sessions.
//!
//! A [`RandomAccessFile`] keeps its own file pointer instead of relying on
//! the descriptor position. Every transfer happens at an explicit position:
//! the pointer itself, or the pointer plus the caller's offset. The pointer
//! then moves to the end of the transfer.

use fileio_core::{FdGuard, FileIoError, FileIoResult, OpenMode, RawFd};
use tracing::instrument;

use crate::ops::{CREATE_PERM, ReadOptions, WriteOptions};
use crate::{FileInfo, FileIo, check, check_fd};

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAccessOptions {
    /// Initial file pointer and lower bound of the accessible window.
    pub start: Option<i64>,
    /// Last accessible byte, inclusive.
    pub end: Option<i64>,
}

#[derive(Debug)]
pub struct RandomAccessFile {
    guard: FdGuard,
    file_pointer: i64,
    end: Option<u64>,
}

impl RandomAccessFile {
    pub fn fd(&self) -> FileIoResult<RawFd> {
        self.guard.fd()
    }

    pub fn get_fpointer(&self) -> FileIoResult<i64> {
        self.guard.fd()?;
        Ok(self.file_pointer)
    }

    /// Move the in-memory file pointer. The descriptor is not touched.
    pub fn set_file_pointer(&mut self, file_pointer: i64) -> FileIoResult<()> {
        self.guard.fd()?;
        if file_pointer < 0 {
            let err = FileIoError::invalid_argument("random_access.set_file_pointer");
            return Err(err);
        }
        self.file_pointer = file_pointer;
        Ok(())
    }

    fn effective_offset(&self, context: &'static str, offset: Option<i64>) -> FileIoResult<u64> {
        let effective = match offset {
            Some(offset) if offset >= 0 => self
                .file_pointer
                .checked_add(offset)
                .ok_or_else(|| FileIoError::invalid_argument(context))?,
            _ => self.file_pointer,
        };
        u64::try_from(effective).map_err(|_| FileIoError::invalid_argument(context))
    }

    /// Clamp a transfer so it never crosses the end of the window.
    fn window(&self, at: u64, len: usize) -> usize {
        match self.end {
            Some(end) if at > end => 0,
            Some(end) => len.min((end - at + 1).min(usize::MAX as u64) as usize),
            None => len,
        }
    }

    #[instrument(level = "debug", skip_all, fields(fp = self.file_pointer, ?options))]
    pub fn read(&mut self, buf: &mut [u8], options: ReadOptions) -> FileIoResult<usize> {
        let fd = self.guard.fd()?;
        let len = crate::ops::transfer_len("random_access.read", options.length, buf.len())?;
        let at = self.effective_offset("random_access.read", options.offset)?;
        let len = self.window(at, len);
        let nread = if len == 0 {
            0
        } else {
            check(
                "random_access.read",
                self.guard.backend().read(fd, &mut buf[..len], Some(at)),
            )?
        };
        self.file_pointer = (at + nread as u64) as i64;
        Ok(nread)
    }

    #[instrument(level = "debug", skip_all, fields(fp = self.file_pointer, ?options))]
    pub fn write(&mut self, buf: &[u8], options: WriteOptions) -> FileIoResult<usize> {
        let fd = self.guard.fd()?;
        let len = crate::ops::transfer_len("random_access.write", options.length, buf.len())?;
        let at = self.effective_offset("random_access.write", options.offset)?;
        let len = self.window(at, len);
        let nwritten = if len == 0 {
            0
        } else {
            check(
                "random_access.write",
                self.guard.backend().write(fd, &buf[..len], Some(at)),
            )?
        };
        self.file_pointer = (at + nwritten as u64) as i64;
        Ok(nwritten)
    }

    /// Close the session. Every later call fails with a bad-descriptor error.
    pub fn close(&mut self) -> FileIoResult<()> {
        self.guard.close()
    }
}

impl FileIo {
    /// Open a random-access session on a path, or on a duplicate of `fd`.
    ///
    /// `mode` defaults to read-write with create for paths and is ignored for
    /// descriptors.
    #[instrument(level = "debug", skip_all, fields(?file, ?mode, ?options))]
    pub fn create_random_access_file(
        &self,
        file: &FileInfo,
        mode: Option<i64>,
        options: RandomAccessOptions,
    ) -> FileIoResult<RandomAccessFile> {
        let start = match options.start {
            Some(start) if start < 0 => {
                return Err(FileIoError::invalid_argument("random_access.start"));
            }
            Some(start) => start,
            None => 0,
        };
        let end = match options.end {
            Some(end) if end < start => {
                return Err(FileIoError::invalid_argument("random_access.end"));
            }
            Some(end) => Some(end as u64),
            None => None,
        };

        let guard = match file {
            FileInfo::Path(path) => {
                let mode = match mode {
                    Some(raw) => OpenMode::from_raw(raw)?,
                    None => OpenMode::READ_WRITE | OpenMode::CREATE,
                };
                let resolved = self.resolve(path)?;
                let fd = check(
                    "random_access.open",
                    self.backend.open(&resolved.real_path, mode, CREATE_PERM),
                )?;
                self.guard(fd)?
            }
            FileInfo::Fd(fd) => {
                let fd = check_fd("random_access.fd", *fd)?;
                let dup = check("random_access.dup", self.backend.dup(fd))?;
                self.guard(dup)?
            }
        };

        Ok(RandomAccessFile {
            guard,
            file_pointer: start,
            end,
        })
    }
}
