use fileio_core::{FileIoError, FileIoResult};
use tracing::instrument;

use crate::{FileIo, check};

/// Upper bound for both attribute names and values, in bytes.
pub const XATTR_MAX_LEN: usize = 4096;

fn check_key(context: &'static str, key: &str) -> FileIoResult<()> {
    if key.is_empty() || key.len() > XATTR_MAX_LEN {
        return Err(FileIoError::invalid_argument(context));
    }
    Ok(())
}

impl FileIo {
    #[instrument(level = "debug", skip_all, fields(%path, %key, value_len = value.len()))]
    pub fn set_xattr(&self, path: &str, key: &str, value: &str) -> FileIoResult<()> {
        check_key("set_xattr.key", key)?;
        if value.len() > XATTR_MAX_LEN {
            return Err(FileIoError::invalid_argument("set_xattr.value"));
        }
        let resolved = self.resolve(path)?;
        check(
            "set_xattr",
            self.backend
                .setxattr(&resolved.real_path, key, value.as_bytes()),
        )
    }

    /// Read an extended attribute; a missing attribute reads as `""`.
    #[instrument(level = "debug", skip_all, fields(%path, %key))]
    pub fn get_xattr(&self, path: &str, key: &str) -> FileIoResult<String> {
        check_key("get_xattr.key", key)?;
        let resolved = self.resolve(path)?;
        let value = check("get_xattr", self.backend.getxattr(&resolved.real_path, key))?;
        Ok(String::from_utf8_lossy(&value).into_owned())
    }
}
