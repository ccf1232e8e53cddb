//! Directory-wide moves and copies.
//!
//! Both operations apply entries one at a time and keep going past
//! per-entry conflicts, which are collected and reported together. Entries
//! that were applied stay applied. A [`TaskSignal`] is polled before each
//! entry; an entry that already started always finishes.

use std::collections::VecDeque;
use std::sync::Arc;

use fileio_core::path;
use fileio_core::stat::DirEntryKind;
use fileio_core::{
    AccessMode, ConflictFiles, FileIoError, FileIoErrorKind, FileIoResult, TaskSignal,
};
use tracing::instrument;

use crate::ops::{DIR_PERM, join};
use crate::{FileIo, check};

/// Fail if the target directory exists and is not empty.
pub const MOVE_DIR_THROW: i32 = 0;
/// Merge, reporting every file that already exists.
pub const MOVE_DIR_FILE_THROW: i32 = 1;
/// Merge, replacing files that already exist.
pub const MOVE_DIR_FILE_REPLACE: i32 = 2;
/// Replace the target directory as a whole.
pub const MOVE_DIR_REPLACE: i32 = 3;

/// Fail on every file that already exists.
pub const COPY_DIR_THROW: i32 = 0;
/// Overwrite files that already exist.
pub const COPY_DIR_OVERWRITE: i32 = 1;

#[derive(Default)]
struct Conflicts(VecDeque<ConflictFiles>);

impl Conflicts {
    /// Directory conflicts are the most severe and are listed first.
    fn directory(&mut self, src: &str, dest: &str) {
        self.0.push_front(ConflictFiles::new(src, dest));
    }

    fn file(&mut self, src: &str, dest: &str) {
        self.0.push_back(ConflictFiles::new(src, dest));
    }

    fn into_result(self, context: &'static str) -> FileIoResult<()> {
        if self.0.is_empty() {
            return Ok(());
        }
        Err(FileIoError::new(FileIoErrorKind::AlreadyExists, context)
            .with_conflicts(self.0.into_iter().collect()))
    }
}

struct Batch<'a> {
    io: &'a FileIo,
    signal: Option<&'a TaskSignal>,
    conflicts: Conflicts,
}

impl Batch<'_> {
    fn cancelled(&self, path: &str) -> FileIoResult<()> {
        match self.signal {
            Some(signal) if signal.check_cancel(path) => {
                tracing::debug!(path, "batch cancelled");
                Err(FileIoError::new(FileIoErrorKind::Cancelled, "batch.cancel"))
            }
            _ => Ok(()),
        }
    }

    fn kind_of(&self, path: &str) -> Option<DirEntryKind> {
        let stat = self.io.backend.lstat(path).ok()?;
        Some(if stat.is_directory() {
            DirEntryKind::Directory
        } else if stat.is_symbolic_link() {
            DirEntryKind::Symlink
        } else if stat.is_file() {
            DirEntryKind::File
        } else {
            DirEntryKind::Other
        })
    }

    /// Merge the contents of `src` into the existing directory `dest`.
    fn merge_move(&mut self, src: &str, dest: &str, replace_files: bool) -> FileIoResult<()> {
        let io = self.io;
        for entry in check("move_dir.read_dir", io.backend.read_dir(src))? {
            let from = join(src, &entry.name);
            let to = join(dest, &entry.name);
            self.cancelled(&from)?;
            let existing = self.kind_of(&to);
            match (entry.kind, existing) {
                (DirEntryKind::Directory, None) => {
                    if let Err(err) = io.backend.rename(&from, &to) {
                        if !err.is(libc::EXDEV) {
                            return check("move_dir.rename", Err(err));
                        }
                        check("move_dir.mkdir", io.backend.mkdir(&to, DIR_PERM))?;
                        self.merge_move(&from, &to, replace_files)?;
                    }
                }
                (DirEntryKind::Directory, Some(DirEntryKind::Directory)) => {
                    self.merge_move(&from, &to, replace_files)?;
                }
                (DirEntryKind::Directory, Some(_)) | (_, Some(DirEntryKind::Directory)) => {
                    self.conflicts.directory(&from, &to);
                }
                (_, Some(_)) if !replace_files => self.conflicts.file(&from, &to),
                (_, _) => io.rename_or_copy(&from, &to)?,
            }
        }
        Ok(())
    }

    fn merge_copy(&mut self, src: &str, dest: &str, overwrite: bool) -> FileIoResult<()> {
        let io = self.io;
        for entry in check("copy_dir.read_dir", io.backend.read_dir(src))? {
            let from = join(src, &entry.name);
            let to = join(dest, &entry.name);
            self.cancelled(&from)?;
            let existing = self.kind_of(&to);
            match (entry.kind, existing) {
                (DirEntryKind::Directory, None) => {
                    check("copy_dir.mkdir", io.backend.mkdir(&to, DIR_PERM))?;
                    self.merge_copy(&from, &to, overwrite)?;
                }
                (DirEntryKind::Directory, Some(DirEntryKind::Directory)) => {
                    self.merge_copy(&from, &to, overwrite)?;
                }
                (DirEntryKind::Directory, Some(_)) | (_, Some(DirEntryKind::Directory)) => {
                    self.conflicts.directory(&from, &to);
                }
                (_, Some(_)) if !overwrite => self.conflicts.file(&from, &to),
                (_, _) => check("copy_dir.copy", io.backend.copy_file(&from, &to))?,
            }
        }
        Ok(())
    }
}

fn base_name(path: &str) -> FileIoResult<&str> {
    let trimmed = path.trim_end_matches('/');
    match path::file_name(trimmed) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(FileIoError::invalid_argument("batch.src")),
    }
}

impl FileIo {
    fn require_dir(&self, context: &'static str, path: &str) -> FileIoResult<()> {
        let stat = check(context, self.backend.stat(path))?;
        if !stat.is_directory() {
            return Err(FileIoError::invalid_argument(context));
        }
        Ok(())
    }

    fn is_empty_dir(&self, path: &str) -> FileIoResult<bool> {
        let entries = check("move_dir.read_dir", self.backend.read_dir(path))?;
        Ok(entries.is_empty())
    }

    /// Move the directory `src` into `dest`, as `dest/<name of src>`.
    ///
    /// `mode` is one of [`MOVE_DIR_THROW`], [`MOVE_DIR_FILE_THROW`],
    /// [`MOVE_DIR_FILE_REPLACE`] or [`MOVE_DIR_REPLACE`]. Conflicts are
    /// reported as [`FileIoErrorKind::AlreadyExists`] carrying the list of
    /// offending pairs; `src` is only removed once everything was moved.
    #[instrument(level = "debug", skip_all, fields(%src, %dest, mode))]
    pub fn move_dir(
        &self,
        src: &str,
        dest: &str,
        mode: i32,
        signal: Option<Arc<TaskSignal>>,
    ) -> FileIoResult<()> {
        if !(MOVE_DIR_THROW..=MOVE_DIR_REPLACE).contains(&mode) {
            return Err(FileIoError::invalid_argument("move_dir.mode"));
        }
        let src = self.resolve(src)?.real_path;
        let dest = self.resolve(dest)?.real_path;
        if !src.contains('/') {
            return Err(FileIoError::invalid_argument("move_dir.src"));
        }
        self.require_dir("move_dir.src", &src)?;
        self.require_dir("move_dir.dest", &dest)?;
        check(
            "move_dir.access",
            self.backend.access(&src, AccessMode::WRITE),
        )?;

        let target = join(&dest, base_name(&src)?);
        let mut batch = Batch {
            io: self,
            signal: signal.as_deref(),
            conflicts: Conflicts::default(),
        };
        batch.cancelled(&src)?;

        let target_exists = self.backend.lstat(&target).is_ok();
        if target_exists && mode == MOVE_DIR_THROW && !self.is_empty_dir(&target)? {
            return Err(FileIoError::new(
                FileIoErrorKind::DirNotEmpty,
                "move_dir.target",
            ));
        }
        if target_exists && mode == MOVE_DIR_REPLACE {
            self.remove_tree(&target)?;
        }

        if !target_exists || mode == MOVE_DIR_REPLACE || mode == MOVE_DIR_THROW {
            match self.backend.rename(&src, &target) {
                Ok(()) => return Ok(()),
                Err(code) if code.is(libc::EXDEV) => {
                    tracing::debug!(%src, %target, "cross-device directory move, merging");
                    if self.backend.lstat(&target).is_err() {
                        check("move_dir.mkdir", self.backend.mkdir(&target, DIR_PERM))?;
                    }
                }
                Err(code) => return check("move_dir.rename", Err(code)),
            }
        }

        batch.merge_move(&src, &target, mode != MOVE_DIR_FILE_THROW)?;
        batch.conflicts.into_result("move_dir.conflict")?;
        self.remove_tree(&src)
    }

    /// Copy the directory `src` into `dest`, as `dest/<name of src>`.
    ///
    /// With [`COPY_DIR_THROW`], files that already exist are left alone and
    /// reported as conflicts; with [`COPY_DIR_OVERWRITE`] they are replaced.
    #[instrument(level = "debug", skip_all, fields(%src, %dest, mode))]
    pub fn copy_dir(
        &self,
        src: &str,
        dest: &str,
        mode: i32,
        signal: Option<Arc<TaskSignal>>,
    ) -> FileIoResult<()> {
        if mode != COPY_DIR_THROW && mode != COPY_DIR_OVERWRITE {
            return Err(FileIoError::invalid_argument("copy_dir.mode"));
        }
        let src = self.resolve(src)?.real_path;
        let dest = self.resolve(dest)?.real_path;
        self.require_dir("copy_dir.src", &src)?;
        self.require_dir("copy_dir.dest", &dest)?;

        let src_real = check("copy_dir.realpath", self.backend.realpath(&src))?;
        let dest_real = check("copy_dir.realpath", self.backend.realpath(&dest))?;
        let src_parent = path::parent(&src_real).map(|p| if p.is_empty() { "/" } else { p });
        if src_real == dest_real
            || dest_real.starts_with(&format!("{}/", src_real.trim_end_matches('/')))
            || src_parent == Some(dest_real.as_str())
        {
            return Err(FileIoError::invalid_argument("copy_dir.dest"));
        }

        let target = join(&dest, base_name(&src)?);
        let mut batch = Batch {
            io: self,
            signal: signal.as_deref(),
            conflicts: Conflicts::default(),
        };
        batch.cancelled(&src)?;
        match self.backend.mkdir(&target, DIR_PERM) {
            Ok(()) => {}
            Err(code) if code.is(libc::EEXIST) => self.require_dir("copy_dir.target", &target)?,
            Err(code) => return check("copy_dir.mkdir", Err(code)),
        }

        batch.merge_copy(&src, &target, mode == COPY_DIR_OVERWRITE)?;
        batch.conflicts.into_result("copy_dir.conflict")
    }
}
