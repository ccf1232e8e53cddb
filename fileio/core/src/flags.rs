//! Open and access flags as seen by callers.

use bitflags::bitflags;

use crate::{FileIoError, FileIoResult};

bitflags! {
    /// Caller-facing open mode bits.
    ///
    /// The bit values are fixed by the calling convention; backends translate
    /// them into host flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenMode: u32 {
        const READ_ONLY = 0o0;
        const WRITE_ONLY = 0o1;
        const READ_WRITE = 0o2;
        const CREATE = 0o100;
        const TRUNC = 0o1000;
        const APPEND = 0o2000;
        const NONBLOCK = 0o4000;
        const DIRECTORY = 0o200000;
        const NOFOLLOW = 0o400000;
        const SYNC = 0o4010000;
    }
}

impl OpenMode {
    /// Validate a raw mode value.
    ///
    /// Negative values, unknown bits and `WRITE_ONLY | READ_WRITE` are
    /// rejected before any backend call is made.
    pub fn from_raw(raw: i64) -> FileIoResult<Self> {
        let raw = u32::try_from(raw).map_err(|_| FileIoError::invalid_argument("open.mode"))?;
        let mode =
            OpenMode::from_bits(raw).ok_or_else(|| FileIoError::invalid_argument("open.mode"))?;
        if mode.contains(OpenMode::WRITE_ONLY | OpenMode::READ_WRITE) {
            return Err(FileIoError::invalid_argument("open.mode"));
        }
        Ok(mode)
    }

    pub fn is_readable(self) -> bool {
        !self.contains(OpenMode::WRITE_ONLY)
    }

    pub fn is_writable(self) -> bool {
        self.intersects(OpenMode::WRITE_ONLY | OpenMode::READ_WRITE)
    }
}

bitflags! {
    /// Accessibility checks accepted by `access`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AccessMode: u32 {
        const EXISTS = 0;
        const WRITE = 2;
        const READ = 4;
    }
}

impl AccessMode {
    pub fn from_raw(raw: i32) -> FileIoResult<Self> {
        let raw = u32::try_from(raw).map_err(|_| FileIoError::invalid_argument("access.mode"))?;
        AccessMode::from_bits(raw).ok_or_else(|| FileIoError::invalid_argument("access.mode"))
    }
}

/// Advisory lock operations for `flock`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockOp {
    Shared,
    Exclusive,
    SharedNonBlocking,
    ExclusiveNonBlocking,
    Unlock,
}
