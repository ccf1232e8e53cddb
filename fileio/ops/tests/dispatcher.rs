use std::sync::Arc;

use fileio_core::{BackendCode, FileFilter};
use fileio_mock::{MockBackend, MockOp};
use fileio_ops::{
    FileInfo, FileIo, FileIoConfig, FileIoErrorKind, ListFileOptions, MOVE_FILE_FORCE,
    MOVE_FILE_THROW, ReadOptions, ReadTextOptions, WriteOptions,
};
use pretty_assertions::assert_eq;

const O_RDWR: i64 = 0o2;
const O_CREAT: i64 = 0o100;

fn setup() -> (Arc<MockBackend>, FileIo) {
    let mock = MockBackend::arc();
    let io = FileIo::with_backend(mock.clone());
    (mock, io)
}

#[test]
fn negative_descriptors_never_reach_the_backend() {
    let (mock, io) = setup();
    let mut buf = [0u8; 4];
    let (read, write) = (ReadOptions::default(), WriteOptions::default());
    let kinds = [
        io.read(-1, &mut buf, read).unwrap_err().kind(),
        io.write(-1, b"x", write).unwrap_err().kind(),
        io.lseek(-1, 0, 0).unwrap_err().kind(),
        io.fsync(-1).unwrap_err().kind(),
        io.fdatasync(-1).unwrap_err().kind(),
        io.dup(-1).unwrap_err().kind(),
        io.close(FileInfo::Fd(-1)).unwrap_err().kind(),
        io.stat(&FileInfo::Fd(-1)).unwrap_err().kind(),
        io.truncate(&FileInfo::Fd(-1), None).unwrap_err().kind(),
        io.copy_file(&FileInfo::Fd(-1), &"/dest".into(), 0)
            .unwrap_err()
            .kind(),
        io.fdopen_stream(-1, "r").unwrap_err().kind(),
        io.create_random_access_file(&FileInfo::Fd(-1), None, Default::default())
            .unwrap_err()
            .kind(),
    ];
    assert!(kinds.iter().all(|k| *k == FileIoErrorKind::InvalidArgument));
    assert!(mock.calls().is_empty());
}

#[test_log::test]
fn open_uses_the_descriptor_reported_by_the_backend() {
    let (mock, io) = setup();
    mock.inject(MockOp::Open, Ok(0));
    let file = io.open("fakePath/x.txt", 0).unwrap();
    assert_eq!(file.fd().unwrap(), 0);
    io.fsync(file.fd().unwrap()).unwrap();

    mock.inject(MockOp::Open, Err(BackendCode(-1)));
    let err = io.open("fakePath/x.txt", 0).unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::PermissionDenied);
    assert_eq!(err.code(), 13_900_001);
    assert_eq!(err.message(), "Operation not permitted");
}

#[test]
fn open_rejects_unknown_modes_before_any_call() {
    let (mock, io) = setup();
    for mode in [-1, 0o3, 0o10, 1 << 40] {
        let err = io.open("/data/a", mode).unwrap_err();
        assert_eq!(err.kind(), FileIoErrorKind::InvalidArgument, "{mode:o}");
    }
    assert!(mock.calls().is_empty());
}

#[test]
fn unsupported_uris_fail_without_side_effects() {
    let (mock, io) = setup();
    for uri in [
        "file://media/Photo/1/a.jpg",
        "datashare://media/a",
        "content://contacts/1",
        "ftp://host/a",
        "file:///absolute",
    ] {
        let err = io.open(uri, 0).unwrap_err();
        assert_eq!(err.kind(), FileIoErrorKind::Unsupported, "{uri}");
        assert_eq!(err.code(), 801);
        assert_eq!(
            io.stat(&FileInfo::from(uri)).unwrap_err().kind(),
            FileIoErrorKind::Unsupported
        );
    }
    assert!(mock.calls().is_empty());
}

#[test]
fn docs_uris_are_checked_before_use() {
    let (mock, io) = setup();
    mock.add_file("/storage/Users/a.txt", b"doc");

    let file = io.open("file://docs/storage/Users/a.txt", 0).unwrap();
    assert_eq!(file.path().unwrap(), "file://docs/storage/Users/a.txt");
    assert_eq!(file.name().unwrap(), "a.txt");
    assert_eq!(file.parent().unwrap(), "file://docs/storage/Users");

    mock.clear_calls();
    let missing = "file://docs/storage/Users/missing.txt";
    let err = io.open(missing, 0).unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::NotFound);
    assert_eq!(err.context(), "path.docs_access");
    assert_eq!(mock.calls(), vec![MockOp::Access]);
}

#[test]
fn sandbox_uris_of_other_bundles_resolve_to_the_share_root() {
    let mock = MockBackend::arc();
    let config = FileIoConfig {
        bundle_name: Some("com.example.own".to_string()),
        ..Default::default()
    };
    let io = FileIo::new(mock.clone(), config);
    let shared = "/data/storage/el2/share/r/com.example.other/docs/a%20b";
    mock.add_file(shared, b"");
    mock.add_file("/data/storage/el2/base/own.txt", b"own");

    io.open("file://com.example.other/docs/a%2520b", 0).unwrap();
    let text = io
        .read_text(
            "file://com.example.own/data/storage/el2/base/own.txt",
            &ReadTextOptions::default(),
        )
        .unwrap();
    assert_eq!(text, "own");
}

#[test]
fn close_requires_a_descriptor() {
    let (mock, io) = setup();
    let err = io.close(FileInfo::from("/data/a")).unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::InvalidArgument);

    mock.add_file("/data/a", b"");
    let mut file = io.open("/data/a", 0).unwrap();
    file.close().unwrap();
    let err = file.close().unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::BadDescriptor);
    assert_eq!(err.code(), 13_900_020);
    assert_eq!(mock.call_count(MockOp::Close), 1);
    assert_eq!(
        file.path().unwrap_err().kind(),
        FileIoErrorKind::BadDescriptor
    );
}

#[test]
fn closing_a_raw_descriptor_twice_reports_the_os_error() {
    let (mock, io) = setup();
    mock.add_file("/data/a", b"");
    let fd = io.open("/data/a", 0).unwrap().into_raw_fd().unwrap();
    io.close(FileInfo::Fd(fd)).unwrap();
    let err = io.close(FileInfo::Fd(fd)).unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::BadFileNumber);
}

#[test]
fn write_then_read_round_trips() {
    let (mock, io) = setup();
    mock.add_file("/data/rw.bin", b"");
    let file = io.open("/data/rw.bin", O_RDWR).unwrap();
    let fd = file.fd().unwrap();

    let payload = b"the quick brown fox";
    for n in [0, 1, 7, payload.len()] {
        let written = io
            .write(
                fd,
                payload,
                WriteOptions {
                    offset: Some(0),
                    length: Some(n),
                },
            )
            .unwrap();
        assert_eq!(written, n);

        let mut buf = vec![0u8; payload.len()];
        let read = io
            .read(
                fd,
                &mut buf,
                ReadOptions {
                    offset: Some(0),
                    length: Some(n),
                },
            )
            .unwrap();
        assert_eq!(read, n);
        assert_eq!(&buf[..n], &payload[..n]);
    }

    let err = io
        .read(
            fd,
            &mut [0u8; 2],
            ReadOptions {
                offset: None,
                length: Some(3),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::InvalidArgument);
}

#[test]
fn negative_offsets_use_the_descriptor_position() {
    let (mock, io) = setup();
    mock.add_file("/data/pos", b"");
    let file = io.open("/data/pos", O_RDWR).unwrap();
    let fd = file.fd().unwrap();
    let current = WriteOptions {
        offset: Some(-1),
        length: None,
    };
    io.write(fd, b"abc", current).unwrap();
    io.write(fd, b"def", current).unwrap();
    assert_eq!(mock.file_contents("/data/pos").unwrap(), b"abcdef");
    assert_eq!(io.lseek(fd, 0, 2).unwrap(), 6);
}

#[test]
fn seeking_from_the_current_position_is_illegal() {
    let (mock, io) = setup();
    mock.add_file("/data/seek", b"0123456789");
    let file = io.open("/data/seek", 0).unwrap();
    let fd = file.fd().unwrap();

    for offset in [-5, 0, 5] {
        let err = io.lseek(fd, offset, 1).unwrap_err();
        assert_eq!(err.kind(), FileIoErrorKind::IllegalSeek);
        assert_eq!(err.code(), 13_900_026);
    }
    assert_eq!(
        io.lseek(fd, 0, 3).unwrap_err().kind(),
        FileIoErrorKind::InvalidArgument
    );
    assert_eq!(io.lseek(fd, 4, 0).unwrap(), 4);
    assert_eq!(io.lseek(fd, -1, 2).unwrap(), 9);
    assert_eq!(mock.call_count(MockOp::Lseek), 2);
}

#[test]
fn stat_by_path_and_descriptor() {
    let (mock, io) = setup();
    mock.add_file("/data/s/file", b"12345");
    mock.add_symlink("/data/s/file", "/data/s/link");

    let by_path = io.stat(&"/data/s/link".into()).unwrap();
    assert!(by_path.is_file());
    assert_eq!(by_path.size, 5);

    let link = io.lstat("/data/s/link").unwrap();
    assert!(link.is_symbolic_link());

    let file = io.open("/data/s/file", 0).unwrap();
    let by_fd = io.stat(&FileInfo::Fd(file.fd().unwrap())).unwrap();
    assert_eq!(by_fd.ino, by_path.ino);

    let err = io.stat(&"/data/s/missing".into()).unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::NotFound);
    assert_eq!(err.message(), "No such file or directory");
}

#[test]
fn rename_and_symlink() {
    let (mock, io) = setup();
    mock.add_file("/data/r/a", b"a");
    io.rename("/data/r/a", "/data/r/b").unwrap();
    assert!(!mock.exists("/data/r/a"));
    io.symlink("/data/r/b", "/data/r/c").unwrap();
    assert_eq!(mock.file_contents("/data/r/c").unwrap(), b"a");

    let err = io.rename("/data/r/a", "/data/r/d").unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::NotFound);
    let err = io.symlink("/data/r/b", "/data/r/c").unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::AlreadyExists);
}

#[test]
fn truncate_by_path_opens_then_truncates() {
    let (mock, io) = setup();
    let target = FileInfo::from("fakePath");

    mock.inject(MockOp::Open, Ok(1));
    mock.inject(MockOp::Ftruncate, Ok(1));
    io.truncate(&target, None).unwrap();
    assert!(mock.open_fds().is_empty());

    mock.inject(MockOp::Open, Ok(1));
    mock.inject(MockOp::Ftruncate, Err(BackendCode(-1)));
    let err = io.truncate(&target, None).unwrap_err();
    assert_eq!(err.context(), "truncate.ftruncate");
    assert!(mock.open_fds().is_empty());

    mock.inject(MockOp::Open, Err(BackendCode(-1)));
    let err = io.truncate(&target, None).unwrap_err();
    assert_eq!(err.context(), "truncate.open");

    assert_eq!(
        io.truncate(&target, Some(-1)).unwrap_err().kind(),
        FileIoErrorKind::InvalidArgument
    );
}

#[test]
fn truncate_resizes_files() {
    let (mock, io) = setup();
    mock.add_file("/data/t", b"0123456789");
    io.truncate(&"/data/t".into(), Some(4)).unwrap();
    assert_eq!(mock.file_contents("/data/t").unwrap(), b"0123");

    let file = io.open("/data/t", O_RDWR).unwrap();
    let fd = file.fd().unwrap();
    io.truncate(&FileInfo::Fd(fd), Some(6)).unwrap();
    assert_eq!(mock.file_contents("/data/t").unwrap(), b"0123\0\0");
}

#[test]
fn utimes_keeps_the_access_time() {
    let (mock, io) = setup();
    mock.add_file("/data/u", b"");
    let before = io.stat(&"/data/u".into()).unwrap();
    io.utimes("/data/u", 1_500.0).unwrap();
    let after = io.stat(&"/data/u".into()).unwrap();
    assert_eq!(after.mtime_ns, 1_500_000_000);
    assert_eq!(after.atime_ns, before.atime_ns);

    assert_eq!(
        io.utimes("/data/u", -1.0).unwrap_err().kind(),
        FileIoErrorKind::InvalidArgument
    );
}

#[test]
fn dup_reads_the_path_back_from_proc() {
    let (mock, io) = setup();
    mock.add_file("/data/d", b"");
    let original = io.open("/data/d", 0).unwrap();
    let copy = io.dup(original.fd().unwrap()).unwrap();
    assert_ne!(copy.fd().unwrap(), original.fd().unwrap());
    assert_eq!(copy.path().unwrap(), "/data/d");

    mock.inject(MockOp::Readlink, Err(BackendCode::from_errno(libc::ENOENT)));
    let before = mock.open_fds();
    let err = io.dup(original.fd().unwrap()).unwrap_err();
    assert_eq!(err.context(), "dup.readlink");
    assert_eq!(mock.open_fds(), before);
}

#[test]
fn copy_file_between_paths() {
    let (mock, io) = setup();
    let err = io.copy_file(&"".into(), &"".into(), 0).unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::NotFound);
    assert_eq!(err.message(), "No such file or directory");

    mock.add_file("/data/c/src", b"payload");
    io.copy_file(&"/data/c/src".into(), &"/data/c/dest".into(), 0)
        .unwrap();
    assert_eq!(mock.file_contents("/data/c/dest").unwrap(), b"payload");

    assert_eq!(
        io.copy_file(&"/data/c/src".into(), &"/data/c/dest".into(), 1)
            .unwrap_err()
            .kind(),
        FileIoErrorKind::InvalidArgument
    );
}

#[test]
fn copy_file_with_descriptors_streams_in_chunks() {
    let mock = MockBackend::arc();
    let io = FileIo::new(
        mock.clone(),
        FileIoConfig {
            copy_chunk_size: 4,
            ..Default::default()
        },
    );
    mock.add_file("/data/c/src", b"0123456789");
    mock.add_file("/data/c/dest", b"old contents that are longer");

    let dest = io.open("/data/c/dest", O_RDWR).unwrap();
    io.copy_file(&"/data/c/src".into(), &FileInfo::Fd(dest.fd().unwrap()), 0)
        .unwrap();
    assert_eq!(mock.file_contents("/data/c/dest").unwrap(), b"0123456789");
    assert_eq!(mock.call_count(MockOp::Sendfile), 3);
    assert!(dest.fd().is_ok());

    let src = io.open("/data/c/src", 0).unwrap();
    io.copy_file(&FileInfo::Fd(src.fd().unwrap()), &"/data/c/new".into(), 0)
        .unwrap();
    assert_eq!(mock.file_contents("/data/c/new").unwrap(), b"0123456789");
}

#[test]
fn copy_file_reports_short_transfers() {
    let (mock, io) = setup();
    mock.add_file("/data/c/src", b"0123456789");
    mock.inject(MockOp::Sendfile, Ok(0));
    let src = io.open("/data/c/src", 0).unwrap();
    let err = io
        .copy_file(&FileInfo::Fd(src.fd().unwrap()), &"/data/c/dest".into(), 0)
        .unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::Io);
    assert_eq!(err.context(), "copy_file.sendfile");
}

#[test]
fn read_text_windows() {
    let (mock, io) = setup();
    mock.add_file("/data/text", "héllo world");

    let all = io.read_text("/data/text", &Default::default()).unwrap();
    assert_eq!(all, "héllo world");

    let window = ReadTextOptions {
        offset: Some(7),
        length: Some(100),
        encoding: Some("utf-8".to_string()),
    };
    assert_eq!(io.read_text("/data/text", &window).unwrap(), "world");

    for bad in [
        ReadTextOptions {
            offset: Some(-1),
            ..Default::default()
        },
        ReadTextOptions {
            length: Some(i64::from(u32::MAX) + 1),
            ..Default::default()
        },
        ReadTextOptions {
            encoding: Some("gbk".to_string()),
            ..Default::default()
        },
        ReadTextOptions {
            offset: Some(100),
            ..Default::default()
        },
    ] {
        let err = io.read_text("/data/text", &bad).unwrap_err();
        assert_eq!(err.kind(), FileIoErrorKind::InvalidArgument, "{bad:?}");
    }
}

#[test]
fn access_mkdir_rmdir() {
    let (mock, io) = setup();
    assert!(!io.access("/data/tree", None).unwrap());
    assert_eq!(
        io.access("", None).unwrap_err().kind(),
        FileIoErrorKind::InvalidArgument
    );
    assert_eq!(
        io.access("/data", Some(1)).unwrap_err().kind(),
        FileIoErrorKind::InvalidArgument
    );

    io.mkdir("/data/tree/a/b", true).unwrap();
    assert!(mock.is_dir("/data/tree/a/b"));
    assert_eq!(
        io.mkdir("/data/tree/a/b", true).unwrap_err().kind(),
        FileIoErrorKind::AlreadyExists
    );
    assert_eq!(
        io.mkdir("/data/tree/x/y", false).unwrap_err().kind(),
        FileIoErrorKind::NotFound
    );

    mock.add_file("/data/tree/a/b/f", b"");
    assert!(io.access("/data/tree/a/b/f", Some(0o6)).unwrap());
    mock.set_permissions("/data/tree/a/b/f", 0o444);
    assert_eq!(
        io.access("/data/tree/a/b/f", Some(0o2)).unwrap_err().kind(),
        FileIoErrorKind::AccessDenied
    );

    io.rmdir("/data/tree").unwrap();
    assert!(!mock.exists("/data/tree"));
    assert!(!mock.exists("/data/tree/a/b/f"));
}

#[test]
fn mkdtemp_and_unlink() {
    let (mock, io) = setup();
    mock.add_dir("/data/tmp");
    let made = io.mkdtemp("/data/tmp/job-").unwrap();
    assert!(made.starts_with("/data/tmp/job-"));
    assert!(mock.is_dir(&made));

    mock.add_file("/data/tmp/f", b"");
    io.unlink("/data/tmp/f").unwrap();
    assert_eq!(
        io.unlink("/data/tmp/f").unwrap_err().kind(),
        FileIoErrorKind::NotFound
    );
}

#[test]
fn move_file_modes() {
    let (mock, io) = setup();
    mock.add_file("/data/m/a", b"a");
    mock.add_file("/data/m/b", b"b");

    let err = io
        .move_file("/data/m/a", "/data/m/b", MOVE_FILE_THROW)
        .unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::AlreadyExists);
    io.move_file("/data/m/a", "/data/m/b", MOVE_FILE_FORCE)
        .unwrap();
    assert_eq!(mock.file_contents("/data/m/b").unwrap(), b"a");
    assert!(!mock.exists("/data/m/a"));

    mock.add_dir("/data/m/dir");
    assert_eq!(
        io.move_file("/data/m/dir", "/data/m/c", MOVE_FILE_FORCE)
            .unwrap_err()
            .kind(),
        FileIoErrorKind::IsDir
    );
    assert_eq!(
        io.move_file("/data/m/b", "/data/m/c", 2)
            .unwrap_err()
            .kind(),
        FileIoErrorKind::InvalidArgument
    );
}

#[test]
fn move_file_across_devices_copies() {
    let (mock, io) = setup();
    mock.add_file("/data/m/a", b"payload");
    mock.inject(MockOp::Rename, Err(BackendCode::from_errno(libc::EXDEV)));
    io.move_file("/data/m/a", "/data/m/b", MOVE_FILE_FORCE)
        .unwrap();
    assert_eq!(mock.file_contents("/data/m/b").unwrap(), b"payload");
    assert!(!mock.exists("/data/m/a"));
    assert_eq!(mock.call_count(MockOp::CopyFile), 1);
}

#[test]
fn xattrs() {
    let (mock, io) = setup();
    mock.add_file("/data/x", b"");
    io.set_xattr("/data/x", "user.tag", "blue").unwrap();
    assert_eq!(io.get_xattr("/data/x", "user.tag").unwrap(), "blue");
    assert_eq!(io.get_xattr("/data/x", "user.none").unwrap(), "");

    let long = "k".repeat(4097);
    assert_eq!(
        io.set_xattr("/data/x", &long, "v").unwrap_err().kind(),
        FileIoErrorKind::InvalidArgument
    );
    assert_eq!(
        io.set_xattr("/data/x", "user.tag", &long)
            .unwrap_err()
            .kind(),
        FileIoErrorKind::InvalidArgument
    );
}

#[test]
fn list_file_filters_and_recurses() {
    let (mock, io) = setup();
    mock.add_file("/data/l/a.txt", b"1");
    mock.add_file("/data/l/b.log", b"22");
    mock.add_file("/data/l/photo.JPG", b"333");
    mock.add_file("/data/l/sub/c.txt", b"4444");

    let mut names = io.list_file("/data/l", &Default::default()).unwrap();
    names.sort();
    assert_eq!(names, vec!["a.txt", "b.log", "photo.JPG", "sub"]);

    let options = ListFileOptions {
        recursion: true,
        list_num: 0,
        filter: FileFilter {
            suffix: vec![".txt".to_string()],
            ..Default::default()
        },
    };
    let mut paths = io.list_file("/data/l", &options).unwrap();
    paths.sort();
    assert_eq!(paths, vec!["/a.txt", "/sub/c.txt"]);

    let options = ListFileOptions {
        recursion: false,
        list_num: 0,
        filter: FileFilter {
            file_size_over: Some(1),
            exclude_media: true,
            ..Default::default()
        },
    };
    assert_eq!(io.list_file("/data/l", &options).unwrap(), vec!["b.log"]);

    let limited = ListFileOptions {
        list_num: 2,
        ..Default::default()
    };
    assert_eq!(io.list_file("/data/l", &limited).unwrap().len(), 2);

    assert_eq!(
        io.list_file("/data/l/a.txt", &ListFileOptions::default())
            .unwrap_err()
            .kind(),
        FileIoErrorKind::NotDir
    );
}

#[test]
fn unmapped_backend_codes_are_unknown() {
    let (mock, io) = setup();
    mock.inject(MockOp::Open, Err(BackendCode(-9999)));
    let err = io.open("/data/any", O_CREAT).unwrap_err();
    assert_eq!(err.kind(), FileIoErrorKind::Unknown);
    assert_eq!(err.code(), 13_900_042);
    assert_eq!(err.message(), "Unknown error, errno is -9999");
}

#[test]
fn file_locks() {
    let (mock, io) = setup();
    mock.add_file("/data/lock", b"");
    let a = io.open("/data/lock", 0).unwrap();
    let b = io.open("/data/lock", 0).unwrap();
    a.lock(true).unwrap();
    assert_eq!(
        b.try_lock(false).unwrap_err().kind(),
        FileIoErrorKind::TryAgain
    );
    a.unlock().unwrap();
    b.try_lock(false).unwrap();
}
