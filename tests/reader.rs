use std::io::Write;

use flate2::write::GzEncoder;
use nirvana_filter::reader::{Compression, Reader, ReaderError};

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn test_reader_from_string_lines() {
    let data = "first\nsecond\r\nthird";
    let reader = Reader::from_reader(std::io::Cursor::new(data.as_bytes())).unwrap();
    let lines: Vec<_> = reader.map(|line| line.unwrap()).collect();
    assert_eq!(lines, vec!["first", "second", "third"]);
}

#[test]
fn test_reader_tracks_line_numbers() {
    let data = "a\nb\n";
    let mut reader = Reader::from_reader(std::io::Cursor::new(data.as_bytes())).unwrap();
    assert_eq!(reader.current_line(), 0);
    reader.next().unwrap().unwrap();
    reader.next().unwrap().unwrap();
    assert_eq!(reader.current_line(), 2);
    assert!(reader.next().is_none());
}

#[test]
fn test_reader_empty_input() {
    let reader = Reader::from_reader(std::io::Cursor::new(Vec::new())).unwrap();
    assert_eq!(reader.count(), 0);
}

#[test]
fn test_reader_invalid_utf8() {
    let data = b"ok\n\xff\xfe\n".to_vec();
    let mut reader = Reader::from_reader(std::io::Cursor::new(data)).unwrap();
    assert_eq!(reader.next().unwrap().unwrap(), "ok");
    match reader.next().unwrap() {
        Err(ReaderError::InvalidEncoding { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected an encoding error, got {other:?}"),
    }
}

#[test]
fn test_reader_gzip_stream() {
    let compressed = gzip("{\"header\":{}\n]}\n");
    let reader = Reader::builder()
        .from_reader(std::io::Cursor::new(compressed))
        .compression(Compression::Gzip)
        .build()
        .unwrap();
    let lines: Vec<_> = reader.map(|line| line.unwrap()).collect();
    assert_eq!(lines, vec!["{\"header\":{}", "]}"]);
}

#[test]
fn test_reader_multi_member_gzip() {
    let mut compressed = gzip("one\n");
    compressed.extend(gzip("two\n"));
    let reader = Reader::builder()
        .from_reader(std::io::Cursor::new(compressed))
        .compression(Compression::Gzip)
        .build()
        .unwrap();
    let lines: Vec<_> = reader.map(|line| line.unwrap()).collect();
    assert_eq!(lines, vec!["one", "two"]);
}

#[test]
fn test_reader_detects_gzip_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.json.gz");
    std::fs::write(&path, gzip("alpha\nbeta\n")).unwrap();

    let reader = Reader::from_path(&path).unwrap();
    let lines: Vec<_> = reader.map(|line| line.unwrap()).collect();
    assert_eq!(lines, vec!["alpha", "beta"]);
}

#[test]
fn test_reader_plain_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.json");
    std::fs::write(&path, "alpha\n").unwrap();

    let reader = Reader::from_path(&path).unwrap();
    let lines: Vec<_> = reader.map(|line| line.unwrap()).collect();
    assert_eq!(lines, vec!["alpha"]);
}

#[test]
fn test_reader_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Reader::from_path(dir.path().join("absent.json.gz"));
    assert!(matches!(result, Err(ReaderError::Io(_))));
}

#[test]
fn test_builder_without_source() {
    let result = Reader::builder().build();
    assert!(matches!(result, Err(ReaderError::Builder(_))));
}
