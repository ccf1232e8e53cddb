use fileio_core::stat::DirEntryKind;
use fileio_core::{FileIoError, FileIoErrorKind, FileIoResult};
use tracing::instrument;

use super::{DIR_PERM, join};
use crate::{FileIo, check};

impl FileIo {
    /// Create a directory. With `recursive`, missing ancestors are created
    /// too; the final component must not exist either way.
    #[instrument(level = "debug", skip_all, fields(%path, recursive))]
    pub fn mkdir(&self, path: &str, recursive: bool) -> FileIoResult<()> {
        let resolved = self.resolve(path)?;
        if !recursive {
            return check("mkdir", self.backend.mkdir(&resolved.real_path, DIR_PERM));
        }
        if self.backend.lstat(&resolved.real_path).is_ok() {
            return Err(FileIoError::new(
                FileIoErrorKind::AlreadyExists,
                "mkdir.exists",
            ));
        }
        self.create_dir_all(&resolved.real_path)
    }

    pub(crate) fn create_dir_all(&self, path: &str) -> FileIoResult<()> {
        let mut prefix = String::with_capacity(path.len());
        for component in path.split('/').filter(|c| !c.is_empty()) {
            if !prefix.is_empty() || path.starts_with('/') {
                prefix.push('/');
            }
            prefix.push_str(component);
            match self.backend.mkdir(&prefix, DIR_PERM) {
                Ok(()) => {}
                Err(code) if code.is(libc::EEXIST) => {}
                Err(code) => return check("mkdir", Err(code)),
            }
        }
        Ok(())
    }

    /// Remove a directory and everything below it.
    #[instrument(level = "debug", skip_all, fields(%path))]
    pub fn rmdir(&self, path: &str) -> FileIoResult<()> {
        if path.is_empty() {
            return Err(FileIoError::invalid_argument("rmdir.path"));
        }
        let resolved = self.resolve(path)?;
        self.remove_tree(&resolved.real_path)
    }

    pub(crate) fn remove_tree(&self, path: &str) -> FileIoResult<()> {
        let stat = check("rmdir.lstat", self.backend.lstat(path))?;
        if !stat.is_directory() {
            return check("rmdir.unlink", self.backend.unlink(path));
        }
        for entry in check("rmdir.read_dir", self.backend.read_dir(path))? {
            let child = join(path, &entry.name);
            match entry.kind {
                DirEntryKind::Directory => self.remove_tree(&child)?,
                _ => check("rmdir.unlink", self.backend.unlink(&child))?,
            }
        }
        check("rmdir", self.backend.rmdir(path))
    }

    #[instrument(level = "debug", skip_all, fields(%path))]
    pub fn unlink(&self, path: &str) -> FileIoResult<()> {
        let resolved = self.resolve(path)?;
        check("unlink", self.backend.unlink(&resolved.real_path))
    }

    /// Create a uniquely named directory whose name starts with `prefix`.
    #[instrument(level = "debug", skip_all, fields(%prefix))]
    pub fn mkdtemp(&self, prefix: &str) -> FileIoResult<String> {
        let resolved = self.resolve(prefix)?;
        check(
            "mkdtemp",
            self.backend
                .mkdtemp(&format!("{}XXXXXX", resolved.real_path)),
        )
    }
}
