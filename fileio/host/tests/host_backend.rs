use fileio_core::flags::{AccessMode, OpenMode};
use fileio_core::stat::DirEntryKind;
use fileio_core::{Backend, SeekWhence};
use fileio_host::HostBackend;
use pretty_assertions::assert_eq;

fn path_in(dir: &tempfile::TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

#[test]
fn file_roundtrip_with_positions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = path_in(&dir, "file");
    let backend = HostBackend::new();

    let fd = backend
        .open(&path, OpenMode::READ_WRITE | OpenMode::CREATE, 0o660)
        .expect("open");
    assert_eq!(backend.write(fd, b"hello world", None).expect("write"), 11);
    assert_eq!(backend.lseek(fd, 0, SeekWhence::Current).expect("tell"), 11);

    let mut buf = [0u8; 5];
    assert_eq!(backend.read(fd, &mut buf, Some(6)).expect("pread"), 5);
    assert_eq!(&buf, b"world");
    assert_eq!(backend.lseek(fd, 0, SeekWhence::Current).expect("tell"), 11);

    backend.ftruncate(fd, 5).expect("ftruncate");
    assert_eq!(backend.fstat(fd).expect("fstat").size, 5);
    backend.fsync(fd).expect("fsync");
    backend.fdatasync(fd).expect("fdatasync");
    backend.close(fd).expect("close");
}

#[test]
fn missing_file_reports_negative_errno() {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = HostBackend::new();
    let err = backend
        .open(&path_in(&dir, "missing"), OpenMode::READ_ONLY, 0)
        .unwrap_err();
    assert!(err.is(libc::ENOENT));
    assert!(err.0 < 0);
}

#[test]
fn directory_primitives() {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = HostBackend::new();
    let sub = path_in(&dir, "sub");
    backend.mkdir(&sub, 0o775).expect("mkdir");
    std::fs::write(format!("{sub}/a.txt"), b"a").expect("seed");
    backend
        .symlink(&format!("{sub}/a.txt"), &format!("{sub}/link"))
        .expect("symlink");

    let mut entries = backend.read_dir(&sub).expect("read_dir");
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    let kinds: Vec<_> = entries.iter().map(|e| e.kind).collect();
    assert_eq!(names, ["a.txt", "link"]);
    assert_eq!(kinds, [DirEntryKind::File, DirEntryKind::Symlink]);

    let link = format!("{sub}/link");
    assert!(backend.lstat(&link).expect("lstat").is_symbolic_link());
    assert!(backend.stat(&link).expect("stat").is_file());
    assert_eq!(
        backend.readlink(&link).expect("readlink"),
        format!("{sub}/a.txt")
    );

    let read_write = AccessMode::READ | AccessMode::WRITE;
    backend.access(&sub, read_write).expect("access");
    backend.unlink(&format!("{sub}/link")).expect("unlink");
    backend.unlink(&format!("{sub}/a.txt")).expect("unlink");
    backend.rmdir(&sub).expect("rmdir");
    let err = backend.access(&sub, AccessMode::EXISTS).unwrap_err();
    assert!(err.is(libc::ENOENT));
}

#[test]
fn mkdtemp_and_utime() {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = HostBackend::new();
    let made = backend
        .mkdtemp(&path_in(&dir, "tmpXXXXXX"))
        .expect("mkdtemp");
    assert!(!made.ends_with("XXXXXX"));
    assert!(backend.stat(&made).expect("stat").is_directory());

    backend
        .utime(&made, 1_000_000_000, 2_500_000_000)
        .expect("utime");
    let stat = backend.stat(&made).expect("stat");
    assert_eq!(stat.mtime_ns, 2_500_000_000);
    assert_eq!(stat.atime(), 1);
}

#[test]
fn dup_and_proc_self_fd() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = path_in(&dir, "dup");
    std::fs::write(&path, b"x").expect("seed");
    let backend = HostBackend::new();
    let fd = backend.open(&path, OpenMode::READ_ONLY, 0).expect("open");
    let copy = backend.dup(fd).expect("dup");
    assert_ne!(fd, copy);
    if cfg!(target_os = "linux") {
        let target = backend
            .readlink(&format!("/proc/self/fd/{copy}"))
            .expect("readlink");
        assert_eq!(target, backend.realpath(&path).expect("realpath"));
    }
    backend.close(copy).expect("close dup");
    backend.close(fd).expect("close");
}

#[test]
fn sendfile_copies_from_offset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = path_in(&dir, "src");
    let dst = path_in(&dir, "dst");
    std::fs::write(&src, b"0123456789").expect("seed");
    let backend = HostBackend::new();
    let in_fd = backend.open(&src, OpenMode::READ_ONLY, 0).expect("src");
    let out_fd = backend
        .open(&dst, OpenMode::WRITE_ONLY | OpenMode::CREATE, 0o660)
        .expect("open dst");
    let sent = backend.sendfile(out_fd, in_fd, 4, 6).expect("sendfile");
    assert_eq!(sent, 6);
    backend.close(in_fd).expect("close");
    backend.close(out_fd).expect("close");
    assert_eq!(std::fs::read(&dst).expect("read"), b"456789");
}
