use fileio_core::{FdGuard, FileIoError, FileIoErrorKind, FileIoResult};

use crate::check;

const CHUNK: usize = 64 * 1024;

/// One pull from a [`ReaderIterator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderIteratorResult {
    pub done: bool,
    pub value: String,
}

/// Yields the lines of a file one at a time, newline included.
///
/// After the last line, [`ReaderIterator::next`] reports `done` with an empty
/// value. The descriptor is released at that point and later calls keep
/// reporting `done` without touching the backend.
#[derive(Debug)]
pub struct ReaderIterator {
    guard: FdGuard,
    buffer: Vec<u8>,
    cursor: usize,
    remaining: u64,
    done: bool,
}

impl ReaderIterator {
    pub(crate) fn new(guard: FdGuard, size: u64) -> Self {
        Self {
            guard,
            buffer: Vec::new(),
            cursor: 0,
            remaining: size,
            done: false,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> FileIoResult<ReaderIteratorResult> {
        if self.done {
            return Ok(finished());
        }
        loop {
            let pending = &self.buffer[self.cursor..];
            if let Some(idx) = pending.iter().position(|b| *b == b'\n') {
                let line = String::from_utf8_lossy(&pending[..=idx]).into_owned();
                self.cursor += idx + 1;
                return Ok(ReaderIteratorResult {
                    done: false,
                    value: line,
                });
            }
            if self.remaining == 0 {
                break;
            }
            self.fill()?;
        }

        if self.cursor < self.buffer.len() {
            let line = String::from_utf8_lossy(&self.buffer[self.cursor..]).into_owned();
            self.cursor = self.buffer.len();
            return Ok(ReaderIteratorResult {
                done: false,
                value: line,
            });
        }

        self.done = true;
        self.buffer = Vec::new();
        self.cursor = 0;
        if let Err(err) = self.guard.close() {
            tracing::warn!(%err, "failed to release exhausted reader");
        }
        Ok(finished())
    }

    fn fill(&mut self) -> FileIoResult<()> {
        self.buffer.drain(..self.cursor);
        self.cursor = 0;

        let want = self.remaining.min(CHUNK as u64) as usize;
        let start = self.buffer.len();
        self.buffer.resize(start + want, 0);
        let fd = self.guard.fd()?;
        let n = check(
            "read_lines.read",
            self.guard
                .backend()
                .read(fd, &mut self.buffer[start..], None),
        )?;
        self.buffer.truncate(start + n);
        if n == 0 {
            tracing::error!(remaining = self.remaining, "file shrank while reading");
            return Err(FileIoError::new(FileIoErrorKind::Io, "read_lines.read"));
        }
        self.remaining = self.remaining.saturating_sub(n as u64);
        Ok(())
    }
}

fn finished() -> ReaderIteratorResult {
    ReaderIteratorResult {
        done: true,
        value: String::new(),
    }
}
