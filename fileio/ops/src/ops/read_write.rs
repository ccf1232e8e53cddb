use fileio_core::{FileIoError, FileIoResult, RawFd};
use tracing::instrument;

use crate::{FileIo, check, check_fd};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Absolute position; `None` or a negative value reads at the current position.
    pub offset: Option<i64>,
    /// Bytes to read; defaults to the buffer length.
    pub length: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Absolute position; `None` or a negative value writes at the current position.
    pub offset: Option<i64>,
    /// Bytes to write; defaults to the buffer length.
    pub length: Option<usize>,
}

/// Validate a transfer length against its buffer.
pub(crate) fn transfer_len(
    context: &'static str,
    length: Option<usize>,
    available: usize,
) -> FileIoResult<usize> {
    match length {
        Some(len) if len > available => Err(FileIoError::invalid_argument(context)),
        Some(len) => Ok(len),
        None => Ok(available),
    }
}

/// Negative offsets select the descriptor position.
pub(crate) fn positional(offset: Option<i64>) -> Option<u64> {
    offset.and_then(|o| u64::try_from(o).ok())
}

impl FileIo {
    #[instrument(level = "debug", skip_all, fields(fd, ?options, nread = tracing::field::Empty))]
    pub fn read(&self, fd: RawFd, buf: &mut [u8], options: ReadOptions) -> FileIoResult<usize> {
        let fd = check_fd("read", fd)?;
        let len = transfer_len("read.length", options.length, buf.len())?;
        if len == 0 {
            return Ok(0);
        }
        let nread = check(
            "read",
            self.backend
                .read(fd, &mut buf[..len], positional(options.offset)),
        )?;
        tracing::Span::current().record("nread", nread);
        Ok(nread)
    }

    #[instrument(level = "debug", skip_all, fields(fd, ?options, nwritten = tracing::field::Empty))]
    pub fn write(&self, fd: RawFd, buf: &[u8], options: WriteOptions) -> FileIoResult<usize> {
        let fd = check_fd("write", fd)?;
        let len = transfer_len("write.length", options.length, buf.len())?;
        if len == 0 {
            return Ok(0);
        }
        let nwritten = check(
            "write",
            self.backend
                .write(fd, &buf[..len], positional(options.offset)),
        )?;
        tracing::Span::current().record("nwritten", nwritten);
        Ok(nwritten)
    }
}
