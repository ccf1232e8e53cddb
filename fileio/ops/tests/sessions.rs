use std::sync::Arc;

use fileio_mock::{MockBackend, MockOp};
use fileio_ops::{
    FileInfo, FileIo, FileIoConfig, FileIoErrorKind, RandomAccessOptions, ReadOptions,
    ReaderIteratorResult, WriteOptions,
};
use pretty_assertions::assert_eq;

fn setup() -> (Arc<MockBackend>, FileIo) {
    let mock = MockBackend::arc();
    let io = FileIo::with_backend(mock.clone());
    (mock, io)
}

fn at(offset: i64) -> ReadOptions {
    ReadOptions {
        offset: Some(offset),
        length: None,
    }
}

#[test]
fn random_access_offsets_are_relative_to_the_file_pointer() {
    let (mock, io) = setup();
    mock.add_file("/data/ra", b"0123456789");
    let mut raf = io
        .create_random_access_file(&"/data/ra".into(), None, RandomAccessOptions::default())
        .unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(raf.read(&mut buf, ReadOptions::default()).unwrap(), 4);
    assert_eq!(&buf, b"0123");
    assert_eq!(raf.get_fpointer().unwrap(), 4);

    assert_eq!(raf.read(&mut buf, at(2)).unwrap(), 4);
    assert_eq!(&buf, b"6789");
    assert_eq!(raf.get_fpointer().unwrap(), 10);

    let calls = mock.calls().len();
    raf.set_file_pointer(0).unwrap();
    assert_eq!(mock.calls().len(), calls);

    raf.write(b"ab", WriteOptions::default()).unwrap();
    assert_eq!(raf.get_fpointer().unwrap(), 2);
    raf.write(
        b"Z",
        WriteOptions {
            offset: Some(3),
            length: None,
        },
    )
    .unwrap();
    assert_eq!(raf.get_fpointer().unwrap(), 6);
    assert_eq!(mock.file_contents("/data/ra").unwrap(), b"ab234Z6789");
}

#[test]
fn random_access_window_bounds_transfers() {
    let (mock, io) = setup();
    mock.add_file("/data/ra", b"0123456789");
    let options = RandomAccessOptions {
        start: Some(2),
        end: Some(5),
    };
    let mut raf = io
        .create_random_access_file(&"/data/ra".into(), None, options)
        .unwrap();

    let mut buf = [0u8; 10];
    assert_eq!(raf.read(&mut buf, ReadOptions::default()).unwrap(), 4);
    assert_eq!(&buf[..4], b"2345");
    assert_eq!(raf.read(&mut buf, ReadOptions::default()).unwrap(), 0);

    let bad = RandomAccessOptions {
        start: Some(5),
        end: Some(2),
    };
    assert_eq!(
        io.create_random_access_file(&"/data/ra".into(), None, bad)
            .unwrap_err()
            .kind(),
        FileIoErrorKind::InvalidArgument
    );
}

#[test]
fn random_access_from_a_descriptor_duplicates_it() {
    let (mock, io) = setup();
    mock.add_file("/data/ra", b"abc");
    let file = io.open("/data/ra", 0).unwrap();
    let raf = io
        .create_random_access_file(
            &FileInfo::Fd(file.fd().unwrap()),
            None,
            RandomAccessOptions::default(),
        )
        .unwrap();
    assert_ne!(raf.fd().unwrap(), file.fd().unwrap());
    assert_eq!(mock.call_count(MockOp::Dup), 1);
}

#[test]
fn closed_random_access_rejects_everything() {
    let (mock, io) = setup();
    mock.add_file("/data/ra", b"abc");
    let mut raf = io
        .create_random_access_file(&"/data/ra".into(), None, RandomAccessOptions::default())
        .unwrap();
    raf.close().unwrap();

    let mut buf = [0u8; 1];
    let errors = [
        raf.read(&mut buf, ReadOptions::default()).unwrap_err(),
        raf.write(b"x", WriteOptions::default()).unwrap_err(),
        raf.get_fpointer().unwrap_err(),
        raf.set_file_pointer(0).unwrap_err(),
        raf.close().unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.kind(), FileIoErrorKind::BadDescriptor);
    }
    assert_eq!(mock.call_count(MockOp::Close), 1);
}

#[test]
fn stream_buffers_writes_until_flushed() {
    let (mock, io) = setup();
    mock.add_dir("/data");
    let mut stream = io.create_stream("/data/st", "w+").unwrap();

    assert_eq!(stream.write(b"hello", None).unwrap(), 5);
    assert_eq!(mock.call_count(MockOp::Write), 0);
    stream.flush().unwrap();
    assert_eq!(mock.call_count(MockOp::Write), 1);
    assert_eq!(mock.file_contents("/data/st").unwrap(), b"hello");

    assert_eq!(stream.seek(0, 0).unwrap(), 0);
    let mut buf = [0u8; 3];
    assert_eq!(stream.read(&mut buf, None).unwrap(), 3);
    assert_eq!(&buf, b"hel");
    assert_eq!(stream.seek(-1, 0).unwrap(), 3);

    let mut rest = [0u8; 8];
    assert_eq!(stream.read(&mut rest, None).unwrap(), 2);
    assert_eq!(&rest[..2], b"lo");
}

#[test]
fn stream_positional_io() {
    let (mock, io) = setup();
    mock.add_file("/data/st", b"0123456789");
    let mut stream = io.create_stream("/data/st", "r+").unwrap();

    let mut buf = [0u8; 2];
    stream.read(&mut buf, None).unwrap();
    assert_eq!(&buf, b"01");
    stream.write(b"X", None).unwrap();
    stream.write(b"AB", Some(6)).unwrap();

    stream.read(&mut buf, Some(4)).unwrap();
    assert_eq!(&buf, b"45");
    stream.close().unwrap();
    assert_eq!(mock.file_contents("/data/st").unwrap(), b"01X345AB89");
}

#[test]
fn stream_appends_and_large_writes_bypass_the_buffer() {
    let mock = MockBackend::arc();
    let io = FileIo::new(
        mock.clone(),
        FileIoConfig {
            stream_buffer_size: 4,
            ..Default::default()
        },
    );
    mock.add_file("/data/log", b"xy");
    let mut stream = io.create_stream("/data/log", "a").unwrap();
    stream.write(b"z", None).unwrap();
    assert_eq!(mock.call_count(MockOp::Write), 0);
    stream.write(b"0123456", None).unwrap();
    assert_eq!(mock.call_count(MockOp::Write), 2);
    stream.close().unwrap();
    assert_eq!(mock.file_contents("/data/log").unwrap(), b"xyz0123456");
}

#[test]
fn stream_mode_governs_direction() {
    let (mock, io) = setup();
    mock.add_file("/data/ro", b"abc");
    let mut stream = io.create_stream("/data/ro", "r").unwrap();
    assert_eq!(
        stream.write(b"x", None).unwrap_err().kind(),
        FileIoErrorKind::BadFileNumber
    );
    assert_eq!(
        io.create_stream("/data/ro", "rw").unwrap_err().kind(),
        FileIoErrorKind::InvalidArgument
    );
}

#[test]
fn closed_stream_errors() {
    let (mock, io) = setup();
    mock.add_file("/data/st", b"abc");
    let file = io.open("/data/st", 0o2).unwrap();
    let mut stream = io
        .fdopen_stream(file.into_raw_fd().unwrap(), "r+")
        .unwrap();
    stream.write(b"Z", Some(0)).unwrap();
    stream.close().unwrap();
    assert_eq!(mock.file_contents("/data/st").unwrap(), b"Zbc");
    assert!(mock.open_fds().is_empty());

    let mut buf = [0u8; 1];
    assert_eq!(stream.close().unwrap_err().kind(), FileIoErrorKind::Io);
    assert_eq!(
        stream.seek(0, 0).unwrap_err().kind(),
        FileIoErrorKind::NotFound
    );
    assert_eq!(
        stream.read(&mut buf, None).unwrap_err().kind(),
        FileIoErrorKind::Io
    );
    assert_eq!(
        stream.write(b"x", None).unwrap_err().kind(),
        FileIoErrorKind::Io
    );
    assert_eq!(stream.flush().unwrap_err().kind(), FileIoErrorKind::Io);
}

#[test]
fn dropped_stream_flushes_pending_writes() {
    let (mock, io) = setup();
    mock.add_dir("/data");
    let mut stream = io.create_stream("/data/st", "w").unwrap();
    stream.write(b"pending", None).unwrap();
    drop(stream);
    assert_eq!(mock.file_contents("/data/st").unwrap(), b"pending");
    assert!(mock.open_fds().is_empty());
}

fn line(value: &str) -> ReaderIteratorResult {
    ReaderIteratorResult {
        done: false,
        value: value.to_string(),
    }
}

fn done() -> ReaderIteratorResult {
    ReaderIteratorResult {
        done: true,
        value: String::new(),
    }
}

#[test_log::test]
fn empty_file_yields_a_single_done() {
    let (mock, io) = setup();
    mock.add_file("/data/empty", b"");
    let mut lines = io.read_lines("/data/empty", None).unwrap();

    assert_eq!(lines.next().unwrap(), done());
    assert_eq!(mock.call_count(MockOp::Read), 0);
    let calls = mock.calls();
    assert_eq!(lines.next().unwrap(), done());
    assert_eq!(mock.calls(), calls);
}

#[test]
fn lines_keep_their_newlines() {
    let (mock, io) = setup();
    mock.add_file("/data/lines", "a\nbb\n\nlast");
    let mut lines = io.read_lines("/data/lines", Some("utf-8")).unwrap();

    assert_eq!(lines.next().unwrap(), line("a\n"));
    assert_eq!(lines.next().unwrap(), line("bb\n"));
    assert_eq!(lines.next().unwrap(), line("\n"));
    assert_eq!(lines.next().unwrap(), line("last"));
    assert_eq!(lines.next().unwrap(), done());
    assert_eq!(lines.next().unwrap(), done());
    assert!(mock.open_fds().is_empty());
}

#[test]
fn long_lines_span_several_reads() {
    let (mock, io) = setup();
    let long = "x".repeat(150_000);
    mock.add_file("/data/long", format!("{long}\nend\n"));
    let mut lines = io.read_lines("/data/long", None).unwrap();

    assert_eq!(lines.next().unwrap(), line(&format!("{long}\n")));
    assert_eq!(lines.next().unwrap(), line("end\n"));
    assert_eq!(lines.next().unwrap(), done());
    assert_eq!(mock.call_count(MockOp::Read), 3);
}

#[test]
fn short_reads_while_reading_lines_are_io_errors() {
    let (mock, io) = setup();
    mock.add_file("/data/lines", "a\nb\n");
    mock.inject(MockOp::Read, Ok(0));
    let mut lines = io.read_lines("/data/lines", None).unwrap();
    assert_eq!(lines.next().unwrap_err().kind(), FileIoErrorKind::Io);

    assert_eq!(
        io.read_lines("/data/lines", Some("gbk"))
            .unwrap_err()
            .kind(),
        FileIoErrorKind::InvalidArgument
    );
}
