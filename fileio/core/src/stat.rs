/// File metadata as reported by `stat`, `lstat` and `fstat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub ino: u64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub atime_ns: i64,
    pub mtime_ns: i64,
    pub ctime_ns: i64,
}

pub const S_IFMT: u32 = 0o170000;
pub const S_IFSOCK: u32 = 0o140000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFBLK: u32 = 0o060000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFCHR: u32 = 0o020000;
pub const S_IFIFO: u32 = 0o010000;

const NANOS_PER_SEC: i64 = 1_000_000_000;

impl FileStat {
    fn file_type(&self) -> u32 {
        self.mode & S_IFMT
    }

    pub fn is_file(&self) -> bool {
        self.file_type() == S_IFREG
    }

    pub fn is_directory(&self) -> bool {
        self.file_type() == S_IFDIR
    }

    pub fn is_symbolic_link(&self) -> bool {
        self.file_type() == S_IFLNK
    }

    pub fn is_block_device(&self) -> bool {
        self.file_type() == S_IFBLK
    }

    pub fn is_character_device(&self) -> bool {
        self.file_type() == S_IFCHR
    }

    pub fn is_fifo(&self) -> bool {
        self.file_type() == S_IFIFO
    }

    pub fn is_socket(&self) -> bool {
        self.file_type() == S_IFSOCK
    }

    /// Permission bits only.
    pub fn permissions(&self) -> u32 {
        self.mode & 0o777
    }

    pub fn atime(&self) -> i64 {
        self.atime_ns.div_euclid(NANOS_PER_SEC)
    }

    pub fn mtime(&self) -> i64 {
        self.mtime_ns.div_euclid(NANOS_PER_SEC)
    }

    pub fn ctime(&self) -> i64 {
        self.ctime_ns.div_euclid(NANOS_PER_SEC)
    }
}

/// Kind of a directory entry returned by `read_dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: DirEntryKind,
}
