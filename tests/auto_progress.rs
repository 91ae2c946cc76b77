//! Auto progress wrappers driving bars end to end.

use std::{
    io::{self, Cursor, Read, Write},
    time::Duration,
};

use progline::{AutoProgress, AutoProgressReader, AutoProgressWriter, Closable};

mod common;
use common::{plain_config, Capture};

#[test]
fn known_total_completes_with_summary() {
    let capture = Capture::default();
    let bar = plain_config(&capture, 10).new_bar();
    let mut progress = AutoProgress::new(bar, 200);
    progress.update(50);
    progress.update(150);
    progress.end();

    assert_eq!(progress.current(), 200);
    assert!(progline::is_done(progress.percent()));
    let out = capture.contents();
    let last = out.rsplit('\r').next().unwrap();
    assert!(last.starts_with("◅██████████▻ 100.0% 200 b in "), "{last:?}");
    assert!(last.ends_with("/s\x1b[K\n"), "{last:?}");
    assert!(!last.contains("remaining"));
}

#[test]
fn reader_and_writer_in_a_multi_bar() {
    let capture = Capture::default();
    let cfg = plain_config(&capture, 8)
        .with_extra_lines(0)
        .with_update_interval(Duration::ZERO);
    let data = vec![1u8; 64 * 1024];
    let total = data.len() as i64;

    let mut reader = AutoProgressReader::new(
        cfg.clone().with_prefix("R ").new_bar(),
        Cursor::new(data),
        total,
    );
    let mut writer = AutoProgressWriter::new(
        cfg.clone().with_prefix("W ").new_bar(),
        io::BufWriter::new(Vec::new()),
        total,
    );
    let mbar = cfg.new_multi_bar(vec![
        reader.progress().bar().clone(),
        writer.progress().bar().clone(),
    ]);
    assert_eq!(writer.progress().bar().index(), 1);

    let mut chunk = [0u8; 4096];
    loop {
        let n = reader.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        writer.write_all(&chunk[..n]).unwrap();
    }
    writer.close().unwrap();
    reader.end();
    mbar.end();

    assert_eq!(reader.progress().current(), total);
    assert_eq!(writer.progress().current(), total);
    assert_eq!(writer.get_ref().get_ref().len() as i64, total);
    let out = capture.contents();
    assert!(out.contains("\rR ◅████████▻ 100.0% 64 Kb in "), "{out:?}");
    assert!(out.contains("\r\x1b[1BW ◅████████▻ 100.0% 64 Kb in "), "{out:?}");
}

#[test]
fn read_errors_propagate() {
    struct Failing;
    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    let capture = Capture::default();
    let mut reader = AutoProgressReader::new(plain_config(&capture, 4).new_bar(), Failing, 10);
    let err = reader.read(&mut [0u8; 8]).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    assert_eq!(reader.progress().current(), 0);
    let _ = reader.into_inner();
    assert!(capture.contents().ends_with('\n'));
}
