//! Value types configuring directory listing.

use glob::{MatchOptions, Pattern, PatternError};

use crate::stat::{DirEntryKind, FileStat};
use crate::{FileIoError, FileIoResult};

#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    /// Accepted extensions including the leading `.`; directories always pass.
    pub suffix: Vec<String>,
    /// Shell-style name patterns.
    pub display_name: Vec<String>,
    /// Only entries strictly larger than this many bytes.
    pub file_size_over: Option<u64>,
    /// Only entries modified strictly after this time, in seconds.
    pub last_modified_after: Option<f64>,
    /// Drop image, audio and video files.
    pub exclude_media: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListFileOptions {
    pub recursion: bool,
    /// Maximum number of results; `0` means unlimited.
    pub list_num: usize,
    pub filter: FileFilter,
}

/// A [`FileFilter`] with its name patterns compiled.
#[derive(Debug)]
pub struct CompiledFilter {
    suffix: Vec<String>,
    display_name: Vec<Pattern>,
    file_size_over: Option<u64>,
    last_modified_after: Option<f64>,
    exclude_media: bool,
}

const MEDIA_SUFFIXES: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".heic", ".mp3", ".aac", ".flac", ".wav",
    ".ogg", ".mp4", ".mkv", ".mov", ".avi", ".3gp",
];

const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

impl CompiledFilter {
    pub fn new(filter: &FileFilter) -> FileIoResult<Self> {
        let invalid = |_: PatternError| FileIoError::invalid_argument("filter.display_name");
        let display_name = filter
            .display_name
            .iter()
            .map(|p| Pattern::new(p).map_err(invalid))
            .collect::<FileIoResult<Vec<_>>>()?;
        Ok(Self {
            suffix: filter.suffix.clone(),
            display_name,
            file_size_over: filter.file_size_over,
            last_modified_after: filter.last_modified_after,
            exclude_media: filter.exclude_media,
        })
    }

    pub fn needs_stat(&self) -> bool {
        self.file_size_over.is_some() || self.last_modified_after.is_some()
    }

    fn suffix_matches(&self, name: &str, kind: DirEntryKind) -> bool {
        if self.suffix.is_empty() || kind == DirEntryKind::Directory {
            return true;
        }
        match name.rfind('.') {
            Some(idx) => self.suffix.iter().any(|s| s == &name[idx..]),
            None => false,
        }
    }

    fn is_media(&self, name: &str, kind: DirEntryKind) -> bool {
        if !self.exclude_media || kind == DirEntryKind::Directory {
            return false;
        }
        let lower = name.to_ascii_lowercase();
        MEDIA_SUFFIXES.iter().any(|s| lower.ends_with(s))
    }

    fn name_matches(&self, name: &str) -> bool {
        self.display_name.is_empty()
            || self
                .display_name
                .iter()
                .any(|p| p.matches_with(name, NAME_MATCH))
    }

    /// Whether an entry passes. `stat` must be provided when [`Self::needs_stat`].
    pub fn accepts(&self, name: &str, kind: DirEntryKind, stat: Option<&FileStat>) -> bool {
        if !self.suffix_matches(name, kind)
            || !self.name_matches(name)
            || self.is_media(name, kind)
        {
            return false;
        }
        if let Some(limit) = self.file_size_over {
            match stat {
                Some(stat) if stat.size > limit => {}
                _ => return false,
            }
        }
        if let Some(after) = self.last_modified_after {
            match stat {
                Some(stat) if stat.mtime() as f64 > after => {}
                _ => return false,
            }
        }
        true
    }
}
