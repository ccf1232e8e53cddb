use fileio_core::{AccessMode, FileIoError, FileIoResult};
use tracing::instrument;

use crate::{FileIo, check};

impl FileIo {
    /// Whether `path` exists and grants `mode` (an [`AccessMode`] bit set,
    /// existence only by default). A missing entry is `Ok(false)`.
    #[instrument(level = "debug", skip_all, fields(%path, ?mode))]
    pub fn access(&self, path: &str, mode: Option<i32>) -> FileIoResult<bool> {
        if path.is_empty() {
            return Err(FileIoError::invalid_argument("access.path"));
        }
        let mode = AccessMode::from_raw(mode.unwrap_or(0))?;
        let resolved = self.resolve(path)?;
        match self.backend.access(&resolved.real_path, mode) {
            Ok(()) => Ok(true),
            Err(code) if code.is(libc::ENOENT) => Ok(false),
            Err(code) => check("access", Err(code)),
        }
    }
}
