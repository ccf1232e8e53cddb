use fileio_core::{FileIoError, FileIoResult};
use tracing::instrument;

use crate::{FileIo, check};

const NANOS_PER_MILLI: f64 = 1_000_000.0;

impl FileIo {
    /// Set the modification time of `path` in milliseconds since the epoch.
    /// The access time is preserved.
    #[instrument(level = "debug", skip_all, fields(%path, mtime_ms))]
    pub fn utimes(&self, path: &str, mtime_ms: f64) -> FileIoResult<()> {
        if !mtime_ms.is_finite() || mtime_ms < 0.0 {
            return Err(FileIoError::invalid_argument("utimes.mtime"));
        }
        let resolved = self.resolve(path)?;
        let stat = check("utimes.stat", self.backend.stat(&resolved.real_path))?;
        let mtime_ns = (mtime_ms * NANOS_PER_MILLI) as i64;
        check(
            "utimes",
            self.backend
                .utime(&resolved.real_path, stat.atime_ns, mtime_ns),
        )
    }
}
