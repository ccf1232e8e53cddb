//! Buffered stream sessions, in the manner of stdio `FILE` streams.

use fileio_core::{
    FdGuard, FileIoError, FileIoErrorKind, FileIoResult, OpenMode, RawFd, SeekWhence,
};
use tracing::instrument;

use crate::ops::{CREATE_PERM, positional};
use crate::{FileIo, check, check_fd};

/// Translate an `fopen`-style mode string.
fn parse_mode(mode: &str) -> FileIoResult<OpenMode> {
    let mode = match mode {
        "r" => OpenMode::READ_ONLY,
        "r+" => OpenMode::READ_WRITE,
        "w" => OpenMode::WRITE_ONLY | OpenMode::CREATE | OpenMode::TRUNC,
        "w+" => OpenMode::READ_WRITE | OpenMode::CREATE | OpenMode::TRUNC,
        "a" => OpenMode::WRITE_ONLY | OpenMode::CREATE | OpenMode::APPEND,
        "a+" => OpenMode::READ_WRITE | OpenMode::CREATE | OpenMode::APPEND,
        _ => return Err(FileIoError::invalid_argument("stream.mode")),
    };
    Ok(mode)
}

/// A buffered stream over an owned descriptor.
///
/// Reads fill a read-ahead buffer and writes are collected until the buffer
/// is full, [`FsStream::flush`] is called, or the stream repositions. Once
/// closed, [`FsStream::seek`] fails with [`FileIoErrorKind::NotFound`] and
/// every other call with [`FileIoErrorKind::Io`].
#[derive(Debug)]
pub struct FsStream {
    guard: FdGuard,
    mode: OpenMode,
    capacity: usize,
    read_buf: Vec<u8>,
    read_pos: usize,
    write_buf: Vec<u8>,
}

impl FsStream {
    fn new(guard: FdGuard, mode: OpenMode, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            guard,
            mode,
            capacity,
            read_buf: Vec::new(),
            read_pos: 0,
            write_buf: Vec::with_capacity(capacity),
        }
    }

    fn live_fd(&self, context: &'static str) -> FileIoResult<RawFd> {
        if self.guard.is_closed() {
            return Err(FileIoError::new(FileIoErrorKind::Io, context));
        }
        self.guard.fd()
    }

    fn read_ahead(&self) -> usize {
        self.read_buf.len() - self.read_pos
    }

    /// Give back bytes read ahead so the descriptor matches the logical position.
    fn discard_read_ahead(&mut self, fd: RawFd) -> FileIoResult<()> {
        let ahead = self.read_ahead();
        self.read_buf.clear();
        self.read_pos = 0;
        if ahead > 0 {
            check(
                "stream.seek",
                self.guard
                    .backend()
                    .lseek(fd, -(ahead as i64), SeekWhence::Current),
            )?;
        }
        Ok(())
    }

    fn write_all(&self, fd: RawFd, mut data: &[u8]) -> FileIoResult<()> {
        while !data.is_empty() {
            let n = check("stream.write", self.guard.backend().write(fd, data, None))?;
            if n == 0 {
                return Err(FileIoError::new(FileIoErrorKind::Io, "stream.write"));
            }
            data = &data[n..];
        }
        Ok(())
    }

    fn flush_writes(&mut self, fd: RawFd) -> FileIoResult<()> {
        if self.write_buf.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.write_buf);
        let res = self.write_all(fd, &pending);
        self.write_buf = pending;
        self.write_buf.clear();
        res
    }

    pub fn fd(&self) -> FileIoResult<RawFd> {
        self.live_fd("stream.fd")
    }

    /// Write `data`, at `offset` when it is non-negative.
    #[instrument(level = "debug", skip_all, fields(len = data.len(), ?offset))]
    pub fn write(&mut self, data: &[u8], offset: Option<i64>) -> FileIoResult<usize> {
        let fd = self.live_fd("stream.write")?;
        if !self.mode.is_writable() {
            return Err(FileIoError::from_native("stream.write", libc::EBADF));
        }
        self.discard_read_ahead(fd)?;
        if let Some(pos) = positional(offset) {
            self.flush_writes(fd)?;
            check(
                "stream.seek",
                self.guard
                    .backend()
                    .lseek(fd, pos as i64, SeekWhence::Start),
            )?;
        }
        if self.write_buf.len() + data.len() > self.capacity {
            self.flush_writes(fd)?;
        }
        if data.len() >= self.capacity {
            self.write_all(fd, data)?;
        } else {
            self.write_buf.extend_from_slice(data);
        }
        Ok(data.len())
    }

    /// Fill `buf` as far as the file allows, from `offset` when it is non-negative.
    #[instrument(level = "debug", skip_all, fields(len = buf.len(), ?offset))]
    pub fn read(&mut self, buf: &mut [u8], offset: Option<i64>) -> FileIoResult<usize> {
        let fd = self.live_fd("stream.read")?;
        if !self.mode.is_readable() {
            return Err(FileIoError::from_native("stream.read", libc::EBADF));
        }
        self.flush_writes(fd)?;
        if let Some(pos) = positional(offset) {
            self.read_buf.clear();
            self.read_pos = 0;
            check(
                "stream.seek",
                self.guard
                    .backend()
                    .lseek(fd, pos as i64, SeekWhence::Start),
            )?;
        }

        let backend = self.guard.backend().clone();
        let mut filled = 0;
        while filled < buf.len() {
            if self.read_ahead() > 0 {
                let n = self.read_ahead().min(buf.len() - filled);
                buf[filled..filled + n]
                    .copy_from_slice(&self.read_buf[self.read_pos..self.read_pos + n]);
                self.read_pos += n;
                filled += n;
                continue;
            }
            if buf.len() - filled >= self.capacity {
                let n = check("stream.read", backend.read(fd, &mut buf[filled..], None))?;
                if n == 0 {
                    break;
                }
                filled += n;
                continue;
            }
            self.read_buf.resize(self.capacity, 0);
            let n = check("stream.read", backend.read(fd, &mut self.read_buf, None))?;
            self.read_buf.truncate(n);
            self.read_pos = 0;
            if n == 0 {
                break;
            }
        }
        Ok(filled)
    }

    pub fn flush(&mut self) -> FileIoResult<()> {
        let fd = self.live_fd("stream.flush")?;
        self.flush_writes(fd)
    }

    /// Reposition the stream and return the new position.
    ///
    /// A negative `offset` leaves the stream where it is and only reports
    /// the current position.
    #[instrument(level = "debug", skip_all, fields(offset, whence))]
    pub fn seek(&mut self, offset: i64, whence: i32) -> FileIoResult<u64> {
        if self.guard.is_closed() {
            return Err(FileIoError::new(FileIoErrorKind::NotFound, "stream.seek"));
        }
        let whence = SeekWhence::try_from(whence)
            .map_err(|_| FileIoError::invalid_argument("stream.whence"))?;
        let fd = self.guard.fd()?;
        self.flush_writes(fd)?;
        let backend = self.guard.backend().clone();
        if offset < 0 {
            let pos = check("stream.tell", backend.lseek(fd, 0, SeekWhence::Current))?;
            return Ok(pos.saturating_sub(self.read_ahead() as u64));
        }
        self.discard_read_ahead(fd)?;
        check("stream.seek", backend.lseek(fd, offset, whence))
    }

    /// Flush and close. Closing twice fails with [`FileIoErrorKind::Io`].
    pub fn close(&mut self) -> FileIoResult<()> {
        let fd = self.live_fd("stream.close")?;
        let flushed = self.flush_writes(fd);
        let closed = self.guard.close();
        flushed.and(closed)
    }
}

impl Drop for FsStream {
    fn drop(&mut self) {
        if self.guard.is_closed() || self.write_buf.is_empty() {
            return;
        }
        if let Ok(fd) = self.guard.fd() {
            if let Err(err) = self.flush_writes(fd) {
                tracing::warn!(fd, %err, "failed to flush stream on drop");
            }
        }
    }
}

impl FileIo {
    /// Open `path` as a buffered stream with an `fopen`-style mode string.
    #[instrument(level = "debug", skip_all, fields(%path, %mode))]
    pub fn create_stream(&self, path: &str, mode: &str) -> FileIoResult<FsStream> {
        let flags = parse_mode(mode)?;
        let resolved = self.resolve(path)?;
        let fd = check(
            "stream.open",
            self.backend.open(&resolved.real_path, flags, CREATE_PERM),
        )?;
        let guard = self.guard(fd)?;
        Ok(FsStream::new(guard, flags, self.config.stream_buffer_size))
    }

    /// Wrap an open descriptor in a buffered stream. The stream takes ownership of `fd`.
    #[instrument(level = "debug", skip_all, fields(fd, %mode))]
    pub fn fdopen_stream(&self, fd: RawFd, mode: &str) -> FileIoResult<FsStream> {
        let fd = check_fd("stream.fd", fd)?;
        let flags = parse_mode(mode)?;
        let guard = self.guard(fd)?;
        Ok(FsStream::new(guard, flags, self.config.stream_buffer_size))
    }
}
