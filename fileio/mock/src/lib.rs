//! An in-memory, scriptable [`Backend`].
//!
//! [`MockBackend`] keeps a small file tree and a descriptor table so that
//! dispatcher code can be exercised without touching the host. On top of the
//! real behaviour, tests can:
//!
//! * queue results for the next calls of an operation with [`MockBackend::inject`],
//! * inspect every primitive that was issued with [`MockBackend::calls`],
//! * run a hook right before an operation executes with [`MockBackend::set_hook`].

mod config;
mod tree;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use fileio_core::backend::{Backend, BackendCode, BackendResult, RawFd, SeekWhence};
use fileio_core::flags::{AccessMode, LockOp, OpenMode};
use fileio_core::stat::{DirEntry, FileStat};
use parking_lot::Mutex;

pub use self::config::MockConfig;
use self::tree::{Errno, NodeKind, Tree, normalize};

const PROC_SELF_FD: &str = "/proc/self/fd/";

/// Primitive operations recorded by the call log and targeted by injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MockOp {
    Open,
    Close,
    Read,
    Write,
    Lseek,
    Stat,
    Lstat,
    Fstat,
    Rename,
    Symlink,
    Ftruncate,
    Fsync,
    Fdatasync,
    Dup,
    Readlink,
    Realpath,
    Utime,
    Mkdtemp,
    Access,
    Mkdir,
    Rmdir,
    Unlink,
    ReadDir,
    CopyFile,
    Sendfile,
    Flock,
    Setxattr,
    Getxattr,
}

pub type Hook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
struct OpenFile {
    path: String,
    pos: u64,
    mode: OpenMode,
}

#[derive(Debug)]
struct State {
    tree: Tree,
    fds: HashMap<RawFd, OpenFile>,
    first_fd: RawFd,
    locks: HashMap<RawFd, LockOp>,
    injected: HashMap<MockOp, VecDeque<BackendResult<i64>>>,
    calls: Vec<MockOp>,
    temp_counter: u32,
    closed_tags: Vec<(RawFd, u64)>,
}

impl State {
    fn allocate_fd(&self) -> RawFd {
        let mut fd = self.first_fd;
        while self.fds.contains_key(&fd) {
            fd += 1;
        }
        fd
    }

    fn file(&self, fd: RawFd) -> Result<&OpenFile, Errno> {
        self.fds.get(&fd).ok_or(libc::EBADF)
    }

    fn file_mut(&mut self, fd: RawFd) -> Result<&mut OpenFile, Errno> {
        self.fds.get_mut(&fd).ok_or(libc::EBADF)
    }

    fn register(&mut self, fd: RawFd, path: String, mode: OpenMode) {
        self.fds.insert(fd, OpenFile { path, pos: 0, mode });
    }
}

pub struct MockBackend {
    state: Mutex<State>,
    hooks: Mutex<HashMap<MockOp, Hook>>,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("open_fds", &self.state.lock().fds.len())
            .finish()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

fn fail<T>(errno: Errno) -> BackendResult<T> {
    Err(BackendCode::from_errno(errno))
}

fn lift<T>(res: Result<T, Errno>) -> BackendResult<T> {
    res.map_err(BackendCode::from_errno)
}

impl MockBackend {
    pub fn new(config: MockConfig) -> Self {
        Self {
            state: Mutex::new(State {
                tree: Tree::new(config.clock_start_secs, config.clock_step_secs),
                fds: HashMap::new(),
                first_fd: config.first_fd,
                locks: HashMap::new(),
                injected: HashMap::new(),
                calls: Vec::new(),
                temp_counter: 0,
                closed_tags: Vec::new(),
            }),
            hooks: Mutex::new(HashMap::new()),
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the result of the next call of `op`.
    ///
    /// An `Err` is returned verbatim. An `Ok(v)` short-circuits operations
    /// that produce an integer or nothing: `open` and `dup` register `v` as
    /// the new descriptor, `read`, `write`, `sendfile` and `lseek` return `v`,
    /// the rest simply succeed. Operations returning richer values ignore
    /// injected `Ok`s.
    pub fn inject(&self, op: MockOp, result: BackendResult<i64>) {
        self.state
            .lock()
            .injected
            .entry(op)
            .or_default()
            .push_back(result);
    }

    /// Run `hook` right before every call of `op`.
    pub fn set_hook(&self, op: MockOp, hook: Hook) {
        self.hooks.lock().insert(op, hook);
    }

    pub fn calls(&self) -> Vec<MockOp> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, op: MockOp) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Descriptors currently open, in ascending order.
    pub fn open_fds(&self) -> Vec<RawFd> {
        let mut fds: Vec<_> = self.state.lock().fds.keys().copied().collect();
        fds.sort_unstable();
        fds
    }

    /// `(fd, tag)` pairs closed through [`Backend::close_with_tag`].
    pub fn closed_tags(&self) -> Vec<(RawFd, u64)> {
        self.state.lock().closed_tags.clone()
    }

    /// Create a regular file, creating missing parent directories.
    pub fn add_file(&self, path: &str, contents: impl AsRef<[u8]>) {
        let mut state = self.state.lock();
        let path = normalize(path);
        if let Some(parent) = tree::parent_of(&path) {
            state.tree.mkdir_all(parent);
        }
        let _ = state.tree.unlink(&path);
        let _ = state
            .tree
            .create_file(&path, contents.as_ref().to_vec(), 0o660);
    }

    /// Create a directory and its missing ancestors.
    pub fn add_dir(&self, path: &str) {
        self.state.lock().tree.mkdir_all(path);
    }

    pub fn add_symlink(&self, target: &str, link: &str) {
        let mut state = self.state.lock();
        let link = normalize(link);
        if let Some(parent) = tree::parent_of(&link) {
            state.tree.mkdir_all(parent);
        }
        let _ = state.tree.symlink(target, &link);
    }

    /// Set the permission bits of a node.
    pub fn set_permissions(&self, path: &str, perm: u32) {
        if let Some(node) = self.state.lock().tree.get_mut(&normalize(path)) {
            node.perm = perm & 0o7777;
        }
    }

    pub fn file_contents(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock();
        let path = state.tree.resolve(path).ok()?;
        state.tree.file_data(&path).ok().cloned()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.lock().tree.get(&normalize(path)).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.state
            .lock()
            .tree
            .get(&normalize(path))
            .is_some_and(|node| node.is_dir())
    }

    /// Record the call, run the hook and pop an injected result.
    fn enter(&self, op: MockOp) -> Option<BackendResult<i64>> {
        let hook = self.hooks.lock().get(&op).cloned();
        if let Some(hook) = hook {
            hook();
        }
        let mut state = self.state.lock();
        state.calls.push(op);
        state.injected.get_mut(&op).and_then(VecDeque::pop_front)
    }

    /// Injected results for operations that yield `()`.
    fn enter_unit(&self, op: MockOp) -> Option<BackendResult<()>> {
        self.enter(op).map(|res| res.map(|_| ()))
    }

    /// Injected results for operations that only honour injected errors.
    fn enter_value(&self, op: MockOp) -> Option<BackendCode> {
        match self.enter(op) {
            Some(Err(code)) => Some(code),
            _ => None,
        }
    }

    fn stat_path(&self, path: &str, follow: bool) -> BackendResult<FileStat> {
        let state = self.state.lock();
        let key = if follow {
            lift(state.tree.resolve(path))?
        } else {
            normalize(path)
        };
        match state.tree.get(&key) {
            Some(node) => Ok(node.stat()),
            None => fail(libc::ENOENT),
        }
    }
}

impl Backend for MockBackend {
    fn open(&self, path: &str, mode: OpenMode, perm: u32) -> BackendResult<RawFd> {
        match self.enter(MockOp::Open) {
            Some(Ok(fd)) => {
                let fd = RawFd::try_from(fd).map_err(|_| BackendCode::from_errno(libc::EMFILE))?;
                self.state.lock().register(fd, normalize(path), mode);
                return Ok(fd);
            }
            Some(Err(code)) => return Err(code),
            None => {}
        }

        let mut state = self.state.lock();
        let key = normalize(path);
        if key.is_empty() {
            return fail(libc::ENOENT);
        }
        let resolved = match state.tree.get(&key) {
            Some(node) if matches!(node.kind, NodeKind::Symlink(_)) => {
                if mode.contains(OpenMode::NOFOLLOW) {
                    return fail(libc::ELOOP);
                }
                lift(state.tree.resolve(&key))?
            }
            Some(_) => key,
            None if mode.contains(OpenMode::CREATE) => {
                lift(state.tree.create_file(&key, Vec::new(), perm & 0o7777))?;
                key
            }
            None => return fail(libc::ENOENT),
        };

        let is_dir = state.tree.get(&resolved).is_some_and(|n| n.is_dir());
        if mode.contains(OpenMode::DIRECTORY) && !is_dir {
            return fail(libc::ENOTDIR);
        }
        if is_dir && mode.is_writable() {
            return fail(libc::EISDIR);
        }
        if mode.contains(OpenMode::TRUNC) && mode.is_writable() {
            lift(state.tree.file_data_mut(&resolved))?.clear();
        }

        let fd = state.allocate_fd();
        state.register(fd, resolved, mode);
        Ok(fd)
    }

    fn close(&self, fd: RawFd) -> BackendResult<()> {
        let injected = self.enter_unit(MockOp::Close);
        let mut state = self.state.lock();
        state.locks.remove(&fd);
        let known = state.fds.remove(&fd).is_some();
        match injected {
            Some(res) => res,
            None if known => Ok(()),
            None => fail(libc::EBADF),
        }
    }

    fn close_with_tag(&self, fd: RawFd, tag: u64) -> BackendResult<()> {
        self.state.lock().closed_tags.push((fd, tag));
        self.close(fd)
    }

    fn read(&self, fd: RawFd, buf: &mut [u8], offset: Option<u64>) -> BackendResult<usize> {
        if let Some(res) = self.enter(MockOp::Read) {
            return res.map(|n| n as usize);
        }
        let mut state = self.state.lock();
        let file = lift(state.file(fd))?.clone();
        if !file.mode.is_readable() {
            return fail(libc::EBADF);
        }
        let data = lift(state.tree.file_data(&file.path))?;
        let start = offset.unwrap_or(file.pos) as usize;
        let n = data.len().saturating_sub(start).min(buf.len());
        if n > 0 {
            buf[..n].copy_from_slice(&data[start..start + n]);
        }
        if offset.is_none() {
            lift(state.file_mut(fd))?.pos += n as u64;
        }
        Ok(n)
    }

    fn write(&self, fd: RawFd, buf: &[u8], offset: Option<u64>) -> BackendResult<usize> {
        if let Some(res) = self.enter(MockOp::Write) {
            return res.map(|n| n as usize);
        }
        let mut state = self.state.lock();
        let file = lift(state.file(fd))?.clone();
        if !file.mode.is_writable() {
            return fail(libc::EBADF);
        }
        let data = lift(state.tree.file_data_mut(&file.path))?;
        let start = match offset {
            Some(offset) => offset as usize,
            None if file.mode.contains(OpenMode::APPEND) => data.len(),
            None => file.pos as usize,
        };
        let end = start + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        if offset.is_none() {
            lift(state.file_mut(fd))?.pos = end as u64;
        }
        Ok(buf.len())
    }

    fn lseek(&self, fd: RawFd, offset: i64, whence: SeekWhence) -> BackendResult<u64> {
        if let Some(res) = self.enter(MockOp::Lseek) {
            return res.map(|pos| pos as u64);
        }
        let mut state = self.state.lock();
        let file = lift(state.file(fd))?.clone();
        let base = match whence {
            SeekWhence::Start => 0,
            SeekWhence::Current => file.pos as i64,
            SeekWhence::End => lift(state.tree.file_data(&file.path))?.len() as i64,
        };
        let Some(pos) = base.checked_add(offset).filter(|pos| *pos >= 0) else {
            return fail(libc::EINVAL);
        };
        lift(state.file_mut(fd))?.pos = pos as u64;
        Ok(pos as u64)
    }

    fn stat(&self, path: &str) -> BackendResult<FileStat> {
        if let Some(code) = self.enter_value(MockOp::Stat) {
            return Err(code);
        }
        self.stat_path(path, true)
    }

    fn lstat(&self, path: &str) -> BackendResult<FileStat> {
        if let Some(code) = self.enter_value(MockOp::Lstat) {
            return Err(code);
        }
        self.stat_path(path, false)
    }

    fn fstat(&self, fd: RawFd) -> BackendResult<FileStat> {
        if let Some(code) = self.enter_value(MockOp::Fstat) {
            return Err(code);
        }
        let state = self.state.lock();
        let file = lift(state.file(fd))?;
        match state.tree.get(&file.path) {
            Some(node) => Ok(node.stat()),
            None => fail(libc::ENOENT),
        }
    }

    fn rename(&self, from: &str, to: &str) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Rename) {
            return res;
        }
        lift(self.state.lock().tree.rename(from, to))
    }

    fn symlink(&self, target: &str, link: &str) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Symlink) {
            return res;
        }
        lift(self.state.lock().tree.symlink(target, link))
    }

    fn ftruncate(&self, fd: RawFd, len: u64) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Ftruncate) {
            return res;
        }
        let mut state = self.state.lock();
        let file = lift(state.file(fd))?.clone();
        if !file.mode.is_writable() {
            return fail(libc::EINVAL);
        }
        lift(state.tree.file_data_mut(&file.path))?.resize(len as usize, 0);
        Ok(())
    }

    fn fsync(&self, fd: RawFd) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Fsync) {
            return res;
        }
        lift(self.state.lock().file(fd).map(|_| ()))
    }

    fn fdatasync(&self, fd: RawFd) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Fdatasync) {
            return res;
        }
        lift(self.state.lock().file(fd).map(|_| ()))
    }

    fn dup(&self, fd: RawFd) -> BackendResult<RawFd> {
        let injected = self.enter(MockOp::Dup);
        let mut state = self.state.lock();
        let file = match (injected, state.file(fd)) {
            (Some(Err(code)), _) => return Err(code),
            (_, Ok(file)) => file.clone(),
            (Some(Ok(_)), Err(_)) => OpenFile {
                path: String::new(),
                pos: 0,
                mode: OpenMode::READ_ONLY,
            },
            (None, Err(errno)) => return fail(errno),
        };
        let new_fd = match injected {
            Some(Ok(v)) => RawFd::try_from(v).map_err(|_| BackendCode::from_errno(libc::EMFILE))?,
            _ => state.allocate_fd(),
        };
        state.fds.insert(new_fd, file);
        Ok(new_fd)
    }

    fn readlink(&self, path: &str) -> BackendResult<String> {
        if let Some(code) = self.enter_value(MockOp::Readlink) {
            return Err(code);
        }
        let state = self.state.lock();
        if let Some(fd) = path.strip_prefix(PROC_SELF_FD) {
            let Ok(fd) = fd.parse::<RawFd>() else {
                return fail(libc::ENOENT);
            };
            return lift(state.file(fd)).map(|file| file.path.clone());
        }
        match state.tree.get(&normalize(path)).map(|node| &node.kind) {
            Some(NodeKind::Symlink(target)) => Ok(target.clone()),
            Some(_) => fail(libc::EINVAL),
            None => fail(libc::ENOENT),
        }
    }

    fn realpath(&self, path: &str) -> BackendResult<String> {
        if let Some(code) = self.enter_value(MockOp::Realpath) {
            return Err(code);
        }
        if path.is_empty() {
            return fail(libc::ENOENT);
        }
        lift(self.state.lock().tree.resolve(path))
    }

    fn utime(&self, path: &str, atime_ns: i64, mtime_ns: i64) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Utime) {
            return res;
        }
        let mut state = self.state.lock();
        let key = lift(state.tree.resolve(path))?;
        match state.tree.get_mut(&key) {
            Some(node) => {
                node.atime_ns = atime_ns;
                node.mtime_ns = mtime_ns;
                Ok(())
            }
            None => fail(libc::ENOENT),
        }
    }

    fn mkdtemp(&self, template: &str) -> BackendResult<String> {
        if let Some(code) = self.enter_value(MockOp::Mkdtemp) {
            return Err(code);
        }
        let Some(prefix) = template.strip_suffix("XXXXXX") else {
            return fail(libc::EINVAL);
        };
        let mut state = self.state.lock();
        loop {
            state.temp_counter += 1;
            let candidate = format!("{prefix}{:06}", state.temp_counter);
            match state.tree.mkdir(&candidate, 0o700) {
                Ok(()) => return Ok(candidate),
                Err(libc::EEXIST) => continue,
                Err(errno) => return fail(errno),
            }
        }
    }

    fn access(&self, path: &str, mode: AccessMode) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Access) {
            return res;
        }
        let state = self.state.lock();
        let key = lift(state.tree.resolve(path))?;
        let Some(node) = state.tree.get(&key) else {
            return fail(libc::ENOENT);
        };
        if mode.contains(AccessMode::READ) && node.perm & 0o400 == 0 {
            return fail(libc::EACCES);
        }
        if mode.contains(AccessMode::WRITE) && node.perm & 0o200 == 0 {
            return fail(libc::EACCES);
        }
        Ok(())
    }

    fn mkdir(&self, path: &str, perm: u32) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Mkdir) {
            return res;
        }
        lift(self.state.lock().tree.mkdir(path, perm & 0o7777))
    }

    fn rmdir(&self, path: &str) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Rmdir) {
            return res;
        }
        lift(self.state.lock().tree.rmdir(path))
    }

    fn unlink(&self, path: &str) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Unlink) {
            return res;
        }
        lift(self.state.lock().tree.unlink(path))
    }

    fn read_dir(&self, path: &str) -> BackendResult<Vec<DirEntry>> {
        if let Some(code) = self.enter_value(MockOp::ReadDir) {
            return Err(code);
        }
        lift(self.state.lock().tree.children(path))
    }

    fn copy_file(&self, src: &str, dest: &str) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::CopyFile) {
            return res;
        }
        let mut state = self.state.lock();
        if src.is_empty() || dest.is_empty() {
            return fail(libc::ENOENT);
        }
        let src = lift(state.tree.resolve(src))?;
        let data = lift(state.tree.file_data(&src))?.clone();
        lift(state.tree.truncate_or_create(dest, 0o660))?;
        let dest = lift(state.tree.resolve(dest))?;
        *lift(state.tree.file_data_mut(&dest))? = data;
        Ok(())
    }

    fn sendfile(
        &self,
        out_fd: RawFd,
        in_fd: RawFd,
        offset: u64,
        len: usize,
    ) -> BackendResult<usize> {
        if let Some(res) = self.enter(MockOp::Sendfile) {
            return res.map(|n| n as usize);
        }
        let mut state = self.state.lock();
        let input = lift(state.file(in_fd))?.clone();
        let output = lift(state.file(out_fd))?.clone();
        if !output.mode.is_writable() {
            return fail(libc::EBADF);
        }
        let data = lift(state.tree.file_data(&input.path))?;
        let start = (offset as usize).min(data.len());
        let end = start.saturating_add(len).min(data.len());
        let chunk = data[start..end].to_vec();

        let target = lift(state.tree.file_data_mut(&output.path))?;
        let at = output.pos as usize;
        if target.len() < at + chunk.len() {
            target.resize(at + chunk.len(), 0);
        }
        target[at..at + chunk.len()].copy_from_slice(&chunk);
        lift(state.file_mut(out_fd))?.pos += chunk.len() as u64;
        Ok(chunk.len())
    }

    fn flock(&self, fd: RawFd, op: LockOp) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Flock) {
            return res;
        }
        let mut state = self.state.lock();
        let path = lift(state.file(fd))?.path.clone();
        if op == LockOp::Unlock {
            state.locks.remove(&fd);
            return Ok(());
        }
        let exclusive = matches!(op, LockOp::Exclusive | LockOp::ExclusiveNonBlocking);
        let blocking = matches!(op, LockOp::Exclusive | LockOp::Shared);
        let conflict = state.locks.iter().any(|(other, held)| {
            *other != fd
                && state.fds.get(other).is_some_and(|f| f.path == path)
                && (exclusive || matches!(held, LockOp::Exclusive | LockOp::ExclusiveNonBlocking))
        });
        if conflict {
            return fail(if blocking {
                libc::EDEADLK
            } else {
                libc::EWOULDBLOCK
            });
        }
        state.locks.insert(fd, op);
        Ok(())
    }

    fn setxattr(&self, path: &str, key: &str, value: &[u8]) -> BackendResult<()> {
        if let Some(res) = self.enter_unit(MockOp::Setxattr) {
            return res;
        }
        let mut state = self.state.lock();
        let resolved = lift(state.tree.resolve(path))?;
        match state.tree.get_mut(&resolved) {
            Some(node) => {
                node.xattrs.insert(key.to_string(), value.to_vec());
                Ok(())
            }
            None => fail(libc::ENOENT),
        }
    }

    fn getxattr(&self, path: &str, key: &str) -> BackendResult<Vec<u8>> {
        if let Some(code) = self.enter_value(MockOp::Getxattr) {
            return Err(code);
        }
        let state = self.state.lock();
        let resolved = lift(state.tree.resolve(path))?;
        Ok(state
            .tree
            .get(&resolved)
            .and_then(|node| node.xattrs.get(key).cloned())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn injected_results_take_precedence() {
        let mock = MockBackend::default();
        mock.inject(MockOp::Open, Ok(0));
        mock.inject(MockOp::Open, Err(BackendCode(-1)));

        assert_eq!(mock.open("/nowhere", OpenMode::READ_ONLY, 0), Ok(0));
        assert_eq!(
            mock.open("/nowhere", OpenMode::READ_ONLY, 0),
            Err(BackendCode(-1))
        );
        assert_eq!(
            mock.open("/nowhere", OpenMode::READ_ONLY, 0),
            Err(BackendCode::from_errno(libc::ENOENT))
        );
        assert_eq!(mock.calls(), vec![MockOp::Open; 3]);
    }

    #[test]
    fn descriptors_track_positions() {
        let mock = MockBackend::default();
        mock.add_file("/data/a.txt", b"hello");
        let fd = mock
            .open("/data/a.txt", OpenMode::READ_WRITE | OpenMode::APPEND, 0)
            .unwrap();
        assert_eq!(fd, 3);
        mock.write(fd, b" world", None).unwrap();
        assert_eq!(mock.file_contents("/data/a.txt").unwrap(), b"hello world");

        let mut buf = [0u8; 5];
        assert_eq!(mock.read(fd, &mut buf, Some(6)).unwrap(), 5);
        assert_eq!(&buf, b"world");
        assert_eq!(mock.lseek(fd, 0, SeekWhence::End).unwrap(), 11);
        mock.close(fd).unwrap();
        assert_eq!(mock.close(fd), Err(BackendCode::from_errno(libc::EBADF)));
    }

    #[test]
    fn proc_self_fd_names_the_open_file() {
        let mock = MockBackend::default();
        mock.add_file("/data/b", b"");
        let fd = mock.open("/data/b", OpenMode::READ_ONLY, 0).unwrap();
        let copy = mock.dup(fd).unwrap();
        let link = format!("/proc/self/fd/{copy}");
        assert_eq!(mock.readlink(&link).unwrap(), "/data/b");
        assert_eq!(mock.open_fds(), vec![fd, copy]);
    }

    #[test]
    fn exclusive_locks_conflict() {
        let mock = MockBackend::default();
        mock.add_file("/l", b"");
        let a = mock.open("/l", OpenMode::READ_ONLY, 0).unwrap();
        let b = mock.open("/l", OpenMode::READ_ONLY, 0).unwrap();
        mock.flock(a, LockOp::Exclusive).unwrap();
        assert_eq!(
            mock.flock(b, LockOp::SharedNonBlocking),
            Err(BackendCode::from_errno(libc::EWOULDBLOCK))
        );
        mock.flock(a, LockOp::Unlock).unwrap();
        mock.flock(b, LockOp::SharedNonBlocking).unwrap();
    }
}
