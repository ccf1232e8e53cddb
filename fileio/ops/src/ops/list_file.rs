use fileio_core::filter::CompiledFilter;
use fileio_core::stat::DirEntryKind;
use fileio_core::{FileIoError, FileIoErrorKind, FileIoResult, ListFileOptions};
use tracing::instrument;

use super::join;
use crate::{FileIo, check};

struct Listing<'a> {
    io: &'a FileIo,
    filter: CompiledFilter,
    recursion: bool,
    limit: usize,
    out: Vec<String>,
}

impl Listing<'_> {
    fn full(&self) -> bool {
        self.limit != 0 && self.out.len() >= self.limit
    }

    fn walk(&mut self, dir: &str, relative: &str) -> FileIoResult<()> {
        let io = self.io;
        let backend = &io.backend;
        for entry in check("list_file.read_dir", backend.read_dir(dir))? {
            if self.full() {
                break;
            }
            if entry.name == "." || entry.name == ".." {
                continue;
            }
            let path = join(dir, &entry.name);
            let shown = format!("{relative}/{}", entry.name);
            if self.recursion && entry.kind == DirEntryKind::Directory {
                self.walk(&path, &shown)?;
                continue;
            }
            let stat = if self.filter.needs_stat() {
                Some(check("list_file.stat", backend.stat(&path))?)
            } else {
                None
            };
            if self.filter.accepts(&entry.name, entry.kind, stat.as_ref()) {
                let shown = if self.recursion { shown } else { entry.name };
                self.out.push(shown);
            }
        }
        Ok(())
    }
}

impl FileIo {
    /// List the entries of a directory.
    ///
    /// Non-recursive listings return bare names. Recursive listings descend
    /// into every subdirectory and return file paths relative to `path`,
    /// each starting with `/`.
    #[instrument(level = "debug", skip_all, fields(%path, recursion = options.recursion))]
    pub fn list_file(&self, path: &str, options: &ListFileOptions) -> FileIoResult<Vec<String>> {
        let resolved = self.resolve(path)?;
        let stat = check("list_file.stat", self.backend.stat(&resolved.real_path))?;
        if !stat.is_directory() {
            return Err(FileIoError::new(FileIoErrorKind::NotDir, "list_file.path"));
        }
        let mut listing = Listing {
            io: self,
            filter: CompiledFilter::new(&options.filter)?,
            recursion: options.recursion,
            limit: options.list_num,
            out: Vec::new(),
        };
        listing.walk(&resolved.real_path, "")?;
        Ok(listing.out)
    }
}
