use fileio_core::{FileIoError, FileIoResult, OpenMode};
use tracing::instrument;

use crate::{FileIo, ReaderIterator, check, check_encoding};

#[derive(Debug, Clone, Default)]
pub struct ReadTextOptions {
    /// Position to start reading at. Defaults to `0`.
    pub offset: Option<i64>,
    /// Maximum number of bytes to read. Defaults to the rest of the file.
    pub length: Option<i64>,
    /// Only `"utf-8"` is supported.
    pub encoding: Option<String>,
}

impl FileIo {
    /// Read a whole file, or a window of it, as text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    #[instrument(level = "debug", skip_all, fields(%path, ?options))]
    pub fn read_text(&self, path: &str, options: &ReadTextOptions) -> FileIoResult<String> {
        let offset = u64::try_from(options.offset.unwrap_or(0))
            .map_err(|_| FileIoError::invalid_argument("read_text.offset"))?;
        let length = match options.length {
            Some(len) if len < 0 || len > i64::from(u32::MAX) => {
                return Err(FileIoError::invalid_argument("read_text.length"));
            }
            Some(len) => Some(len as u64),
            None => None,
        };
        check_encoding("read_text.encoding", options.encoding.as_deref())?;

        let resolved = self.resolve(path)?;
        let fd = check(
            "read_text.open",
            self.backend
                .open(&resolved.real_path, OpenMode::READ_ONLY, 0),
        )?;
        let guard = self.guard(fd)?;
        let size = check("read_text.fstat", self.backend.fstat(guard.fd()?))?.size;
        if offset > size {
            return Err(FileIoError::invalid_argument("read_text.offset"));
        }
        let wanted = length.unwrap_or(size).min(size - offset) as usize;

        let mut buf = vec![0u8; wanted];
        let mut filled = 0;
        while filled < wanted {
            let n = check(
                "read_text.read",
                self.backend.read(
                    guard.fd()?,
                    &mut buf[filled..],
                    Some(offset + filled as u64),
                ),
            )?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Open `path` for line-by-line reading.
    #[instrument(level = "debug", skip_all, fields(%path, ?encoding))]
    pub fn read_lines(&self, path: &str, encoding: Option<&str>) -> FileIoResult<ReaderIterator> {
        check_encoding("read_lines.encoding", encoding)?;
        let resolved = self.resolve(path)?;
        let fd = check(
            "read_lines.open",
            self.backend
                .open(&resolved.real_path, OpenMode::READ_ONLY, 0),
        )?;
        let guard = self.guard(fd)?;
        let size = check("read_lines.fstat", self.backend.fstat(guard.fd()?))?.size;
        Ok(ReaderIterator::new(guard, size))
    }
}
