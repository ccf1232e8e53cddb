//! Asynchronous execution of dispatcher operations.
//!
//! There are two flavours:
//!
//! * [`FileIo::spawn`] runs an operation on the blocking pool and returns a
//!   future resolving to its result on the awaiting task.
//! * [`AsyncWork`] runs an operation on the blocking pool and hands a
//!   continuation back through a bounded [`CompletionQueue`]. Continuations
//!   only run when the owner of the queue drains it, so they always execute
//!   on the caller's context, exactly once each.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fileio_core::{FileIoError, FileIoErrorKind, FileIoResult, FileStat, RawFd, TaskSignal};
use tokio::sync::mpsc;

use crate::{FileInfo, FileIo, FsFile, ReadTextOptions};

type Continuation = Box<dyn FnOnce() + Send + 'static>;

impl FileIo {
    /// Run `work` on the blocking pool.
    ///
    /// `name` is used as the error context if the work never completes.
    pub async fn spawn<T, F>(&self, name: &'static str, work: F) -> FileIoResult<T>
    where
        F: FnOnce(FileIo) -> FileIoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let io = self.clone();
        match tokio::task::spawn_blocking(move || work(io)).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(name, %err, "blocking file operation did not complete");
                Err(FileIoError::new(FileIoErrorKind::Io, name))
            }
        }
    }

    pub async fn open_async(&self, path: &str, mode: i64) -> FileIoResult<FsFile> {
        let path = path.to_string();
        self.spawn("open", move |io| io.open(&path, mode)).await
    }

    pub async fn stat_async(&self, file: FileInfo) -> FileIoResult<FileStat> {
        self.spawn("stat", move |io| io.stat(&file)).await
    }

    pub async fn lstat_async(&self, path: &str) -> FileIoResult<FileStat> {
        let path = path.to_string();
        self.spawn("lstat", move |io| io.lstat(&path)).await
    }

    /// Read into an owned buffer, returning it with the number of bytes read.
    pub async fn read_async(
        &self,
        fd: RawFd,
        mut buf: Vec<u8>,
        options: crate::ReadOptions,
    ) -> FileIoResult<(Vec<u8>, usize)> {
        self.spawn("read", move |io| {
            let n = io.read(fd, &mut buf, options)?;
            Ok((buf, n))
        })
        .await
    }

    pub async fn write_async(
        &self,
        fd: RawFd,
        buf: Vec<u8>,
        options: crate::WriteOptions,
    ) -> FileIoResult<usize> {
        self.spawn("write", move |io| io.write(fd, &buf, options))
            .await
    }

    pub async fn rename_async(&self, src: &str, dest: &str) -> FileIoResult<()> {
        let (src, dest) = (src.to_string(), dest.to_string());
        self.spawn("rename", move |io| io.rename(&src, &dest)).await
    }

    pub async fn truncate_async(&self, file: FileInfo, len: Option<i64>) -> FileIoResult<()> {
        self.spawn("truncate", move |io| io.truncate(&file, len))
            .await
    }

    pub async fn fsync_async(&self, fd: RawFd) -> FileIoResult<()> {
        self.spawn("fsync", move |io| io.fsync(fd)).await
    }

    pub async fn fdatasync_async(&self, fd: RawFd) -> FileIoResult<()> {
        self.spawn("fdatasync", move |io| io.fdatasync(fd)).await
    }

    pub async fn copy_file_async(
        &self,
        src: FileInfo,
        dest: FileInfo,
        mode: i32,
    ) -> FileIoResult<()> {
        self.spawn("copy_file", move |io| io.copy_file(&src, &dest, mode))
            .await
    }

    pub async fn read_text_async(
        &self,
        path: &str,
        options: ReadTextOptions,
    ) -> FileIoResult<String> {
        let path = path.to_string();
        self.spawn("read_text", move |io| io.read_text(&path, &options))
            .await
    }

    pub async fn move_dir_async(
        &self,
        src: &str,
        dest: &str,
        mode: i32,
        signal: Option<Arc<TaskSignal>>,
    ) -> FileIoResult<()> {
        let (src, dest) = (src.to_string(), dest.to_string());
        self.spawn("move_dir", move |io| io.move_dir(&src, &dest, mode, signal))
            .await
    }

    pub async fn copy_dir_async(
        &self,
        src: &str,
        dest: &str,
        mode: i32,
        signal: Option<Arc<TaskSignal>>,
    ) -> FileIoResult<()> {
        let (src, dest) = (src.to_string(), dest.to_string());
        self.spawn("copy_dir", move |io| io.copy_dir(&src, &dest, mode, signal))
            .await
    }
}

/// The receiving side of completed work. Owned by the caller's context.
#[derive(Debug)]
pub struct CompletionQueue {
    tx: mpsc::Sender<Continuation>,
    rx: mpsc::Receiver<Continuation>,
    outstanding: Arc<AtomicUsize>,
}

impl CompletionQueue {
    pub fn new(depth: usize) -> Self {
        let (tx, rx) = mpsc::channel(depth.max(1));
        Self {
            tx,
            rx,
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A queue bounded by the dispatcher's configured completion depth.
    pub fn for_io(io: &FileIo) -> Self {
        Self::new(io.config().completion_queue_depth)
    }

    /// How many finished continuations can wait before workers block.
    pub fn depth(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Work scheduled on this queue whose continuation has not run yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    fn run(&self, continuation: Continuation) {
        continuation();
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }

    /// Run every continuation that is already available. Never waits.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(continuation) = self.rx.try_recv() {
            self.run(continuation);
            ran += 1;
        }
        ran
    }

    /// Wait for, and run, the next continuation.
    ///
    /// Returns `false` without waiting when nothing is outstanding.
    pub async fn run_next(&mut self) -> bool {
        if self.outstanding() == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(continuation) => {
                self.run(continuation);
                true
            }
            None => false,
        }
    }

    /// Run continuations until all scheduled work has completed.
    pub async fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while self.run_next().await {
            ran += 1;
        }
        ran
    }
}

/// Schedules dispatcher operations whose results are delivered through a
/// [`CompletionQueue`].
#[derive(Debug, Clone)]
pub struct AsyncWork {
    io: FileIo,
    tx: mpsc::Sender<Continuation>,
    outstanding: Arc<AtomicUsize>,
}

impl AsyncWork {
    pub fn new(io: FileIo, queue: &CompletionQueue) -> Self {
        Self {
            io,
            tx: queue.tx.clone(),
            outstanding: queue.outstanding.clone(),
        }
    }

    /// Run `exec` on the blocking pool, then queue `complete` with its result.
    ///
    /// A panicking `exec` completes with an [`FileIoErrorKind::Io`] error
    /// carrying `name` as context. Fails without running anything when called
    /// outside a tokio runtime.
    pub fn schedule<T, E, C>(&self, name: &'static str, exec: E, complete: C) -> FileIoResult<()>
    where
        T: Send + 'static,
        E: FnOnce(&FileIo) -> FileIoResult<T> + Send + 'static,
        C: FnOnce(FileIoResult<T>) + Send + 'static,
    {
        let handle = tokio::runtime::Handle::try_current().map_err(|err| {
            tracing::error!(name, %err, "no runtime to schedule work on");
            FileIoError::new(FileIoErrorKind::Io, name)
        })?;
        let io = self.io.clone();
        let tx = self.tx.clone();
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        let outstanding = self.outstanding.clone();
        handle.spawn_blocking(move || {
            let result = match panic::catch_unwind(AssertUnwindSafe(|| exec(&io))) {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(name, "scheduled file operation panicked");
                    Err(FileIoError::new(FileIoErrorKind::Io, name))
                }
            };
            let continuation: Continuation = Box::new(move || complete(result));
            if tx.blocking_send(continuation).is_err() {
                outstanding.fetch_sub(1, Ordering::AcqRel);
                tracing::warn!(name, "completion queue dropped before work finished");
            }
        });
        Ok(())
    }
}
