use std::collections::{BTreeMap, HashMap};

use fileio_core::stat::{DirEntry, DirEntryKind, FileStat, S_IFDIR, S_IFLNK, S_IFREG};

const MAX_SYMLINK_DEPTH: usize = 8;

pub(crate) type Errno = i32;

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    File(Vec<u8>),
    Dir,
    Symlink(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub ino: u64,
    pub perm: u32,
    pub atime_ns: i64,
    pub mtime_ns: i64,
    pub ctime_ns: i64,
    pub xattrs: HashMap<String, Vec<u8>>,
}

impl Node {
    pub fn stat(&self) -> FileStat {
        let (fmt, size) = match &self.kind {
            NodeKind::File(data) => (S_IFREG, data.len() as u64),
            NodeKind::Dir => (S_IFDIR, 0),
            NodeKind::Symlink(target) => (S_IFLNK, target.len() as u64),
        };
        FileStat {
            ino: self.ino,
            mode: fmt | self.perm,
            uid: 0,
            gid: 0,
            size,
            atime_ns: self.atime_ns,
            mtime_ns: self.mtime_ns,
            ctime_ns: self.ctime_ns,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir)
    }
}

/// Normalize a path key: collapse duplicate separators and drop a trailing `/`.
pub(crate) fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let joined = path
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

pub(crate) fn parent_of(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) if path.len() > 1 => Some("/"),
        Some(0) => None,
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

fn child_prefix(dir: &str) -> String {
    if dir == "/" {
        "/".to_string()
    } else {
        format!("{dir}/")
    }
}

#[derive(Debug)]
pub(crate) struct Tree {
    nodes: BTreeMap<String, Node>,
    next_ino: u64,
    clock_ns: i64,
    clock_step_ns: i64,
}

impl Tree {
    pub fn new(clock_start_secs: i64, clock_step_secs: i64) -> Self {
        let mut tree = Self {
            nodes: BTreeMap::new(),
            next_ino: 1,
            clock_ns: clock_start_secs * 1_000_000_000,
            clock_step_ns: clock_step_secs * 1_000_000_000,
        };
        tree.insert("/".to_string(), NodeKind::Dir, 0o755);
        tree
    }

    fn tick(&mut self) -> i64 {
        self.clock_ns += self.clock_step_ns;
        self.clock_ns
    }

    fn insert(&mut self, path: String, kind: NodeKind, perm: u32) {
        let now = self.tick();
        let ino = self.next_ino;
        self.next_ino += 1;
        self.nodes.insert(
            path,
            Node {
                kind,
                ino,
                perm,
                atime_ns: now,
                mtime_ns: now,
                ctime_ns: now,
                xattrs: HashMap::new(),
            },
        );
    }

    pub fn get(&self, path: &str) -> Option<&Node> {
        self.nodes.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Node> {
        self.nodes.get_mut(path)
    }

    /// Follow symlinks until a non-link node is reached.
    pub fn resolve(&self, path: &str) -> Result<String, Errno> {
        let mut current = normalize(path);
        for _ in 0..MAX_SYMLINK_DEPTH {
            match self.nodes.get(&current) {
                Some(Node {
                    kind: NodeKind::Symlink(target),
                    ..
                }) => current = normalize(target),
                Some(_) => return Ok(current),
                None => return Err(libc::ENOENT),
            }
        }
        Err(libc::ELOOP)
    }

    fn require_parent_dir(&self, path: &str) -> Result<(), Errno> {
        let Some(parent) = parent_of(path) else {
            return if path.is_empty() {
                Err(libc::ENOENT)
            } else {
                Ok(())
            };
        };
        match self.nodes.get(parent) {
            Some(node) if node.is_dir() => Ok(()),
            Some(_) => Err(libc::ENOTDIR),
            None => Err(libc::ENOENT),
        }
    }

    pub fn create_file(&mut self, path: &str, data: Vec<u8>, perm: u32) -> Result<(), Errno> {
        let path = normalize(path);
        self.require_parent_dir(&path)?;
        if self.nodes.contains_key(&path) {
            return Err(libc::EEXIST);
        }
        self.insert(path, NodeKind::File(data), perm);
        Ok(())
    }

    pub fn mkdir(&mut self, path: &str, perm: u32) -> Result<(), Errno> {
        let path = normalize(path);
        if path.is_empty() {
            return Err(libc::ENOENT);
        }
        self.require_parent_dir(&path)?;
        if self.nodes.contains_key(&path) {
            return Err(libc::EEXIST);
        }
        self.insert(path, NodeKind::Dir, perm);
        Ok(())
    }

    pub fn mkdir_all(&mut self, path: &str) {
        let path = normalize(path);
        let mut prefix = String::new();
        for (idx, component) in path.split('/').enumerate() {
            if idx == 0 && component.is_empty() {
                continue;
            }
            if idx > 0 || path.starts_with('/') {
                prefix.push('/');
            }
            prefix.push_str(component);
            if !self.nodes.contains_key(&prefix) {
                self.insert(prefix.clone(), NodeKind::Dir, 0o775);
            }
        }
    }

    pub fn symlink(&mut self, target: &str, link: &str) -> Result<(), Errno> {
        let link = normalize(link);
        self.require_parent_dir(&link)?;
        if self.nodes.contains_key(&link) {
            return Err(libc::EEXIST);
        }
        self.insert(link, NodeKind::Symlink(target.to_string()), 0o777);
        Ok(())
    }

    pub fn children(&self, dir: &str) -> Result<Vec<DirEntry>, Errno> {
        let dir = self.resolve(dir)?;
        match self.nodes.get(&dir) {
            Some(node) if node.is_dir() => {}
            Some(_) => return Err(libc::ENOTDIR),
            None => return Err(libc::ENOENT),
        }
        let prefix = child_prefix(&dir);
        let direct = |key: &str| key.len() > prefix.len() && !key[prefix.len()..].contains('/');
        let entries = self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| direct(key))
            .map(|(key, node)| DirEntry {
                name: key[prefix.len()..].to_string(),
                kind: match node.kind {
                    NodeKind::File(_) => DirEntryKind::File,
                    NodeKind::Dir => DirEntryKind::Directory,
                    NodeKind::Symlink(_) => DirEntryKind::Symlink,
                },
            })
            .collect();
        Ok(entries)
    }

    fn has_children(&self, dir: &str) -> bool {
        let prefix = child_prefix(dir);
        self.nodes
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }

    pub fn unlink(&mut self, path: &str) -> Result<(), Errno> {
        let path = normalize(path);
        match self.nodes.get(&path) {
            Some(node) if node.is_dir() => Err(libc::EISDIR),
            Some(_) => {
                self.nodes.remove(&path);
                Ok(())
            }
            None => Err(libc::ENOENT),
        }
    }

    pub fn rmdir(&mut self, path: &str) -> Result<(), Errno> {
        let path = normalize(path);
        match self.nodes.get(&path) {
            Some(node) if !node.is_dir() => Err(libc::ENOTDIR),
            Some(_) if self.has_children(&path) => Err(libc::ENOTEMPTY),
            Some(_) if path == "/" => Err(libc::EBUSY),
            Some(_) => {
                self.nodes.remove(&path);
                Ok(())
            }
            None => Err(libc::ENOENT),
        }
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), Errno> {
        let from = normalize(from);
        let to = normalize(to);
        let src_is_dir = match self.nodes.get(&from) {
            Some(node) => node.is_dir(),
            None => return Err(libc::ENOENT),
        };
        self.require_parent_dir(&to)?;
        if from == to {
            return Ok(());
        }
        if src_is_dir && to.starts_with(&child_prefix(&from)) {
            return Err(libc::EINVAL);
        }
        if let Some(existing) = self.nodes.get(&to) {
            match (src_is_dir, existing.is_dir()) {
                (true, true) if self.has_children(&to) => return Err(libc::ENOTEMPTY),
                (true, false) => return Err(libc::ENOTDIR),
                (false, true) => return Err(libc::EISDIR),
                _ => {}
            }
            self.nodes.remove(&to);
        }

        let from_prefix = child_prefix(&from);
        let moved: Vec<String> = self
            .nodes
            .range(from_prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&from_prefix))
            .map(|(key, _)| key.clone())
            .collect();
        if let Some(node) = self.nodes.remove(&from) {
            self.nodes.insert(to.clone(), node);
        }
        for key in moved {
            if let Some(node) = self.nodes.remove(&key) {
                let suffix = &key[from_prefix.len()..];
                let target = format!("{}{suffix}", child_prefix(&to));
                self.nodes.insert(target, node);
            }
        }
        self.tick();
        Ok(())
    }

    pub fn file_data(&self, path: &str) -> Result<&Vec<u8>, Errno> {
        match self.nodes.get(path) {
            Some(Node {
                kind: NodeKind::File(data),
                ..
            }) => Ok(data),
            Some(node) if node.is_dir() => Err(libc::EISDIR),
            Some(_) => Err(libc::EINVAL),
            None => Err(libc::ENOENT),
        }
    }

    pub fn file_data_mut(&mut self, path: &str) -> Result<&mut Vec<u8>, Errno> {
        let now = self.tick();
        match self.nodes.get_mut(path) {
            Some(node) => {
                node.mtime_ns = now;
                match &mut node.kind {
                    NodeKind::File(data) => Ok(data),
                    NodeKind::Dir => Err(libc::EISDIR),
                    NodeKind::Symlink(_) => Err(libc::EINVAL),
                }
            }
            None => Err(libc::ENOENT),
        }
    }

    pub fn truncate_or_create(&mut self, path: &str, perm: u32) -> Result<(), Errno> {
        let path = normalize(path);
        if self.nodes.contains_key(&path) {
            self.file_data_mut(&path)?.clear();
            Ok(())
        } else {
            self.create_file(&path, Vec::new(), perm)
        }
    }
}
