//! Tests for part-file table storage.

use std::fs;

use polars::df;
use polars::prelude::DataFrame;
use star_model::{OutputFormat, TableSink, WriteMode};
use star_output::{FileSink, ReadError, read_table};

fn ids(frame: &DataFrame) -> Vec<Option<i64>> {
    frame
        .column("id")
        .expect("id column")
        .i64()
        .expect("i64 column")
        .into_iter()
        .collect()
}

fn run_append_and_overwrite(format: OutputFormat) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = FileSink::new(dir.path(), format);

    let mut first = df!("id" => [1i64, 2], "label" => ["a", "b"]).expect("frame");
    let mut second = df!("id" => [3i64], "label" => ["c"]).expect("frame");

    sink.write_table("facts", &mut first, WriteMode::Append)
        .expect("append first");
    sink.write_table("facts", &mut second, WriteMode::Append)
        .expect("append second");
    sink.write_table("dim", &mut first, WriteMode::Overwrite)
        .expect("overwrite first");
    sink.write_table("dim", &mut second, WriteMode::Overwrite)
        .expect("overwrite second");

    let facts = read_table(dir.path(), "facts", format).expect("read facts");
    assert_eq!(ids(&facts), vec![Some(1), Some(2), Some(3)]);

    let dim = read_table(dir.path(), "dim", format).expect("read dim");
    assert_eq!(ids(&dim), vec![Some(3)]);

    let dim_parts = fs::read_dir(sink.table_dir("dim")).expect("dim dir").count();
    assert_eq!(dim_parts, 1);
    assert!(!dir.path().join(".dim.staging").exists());
    assert!(!dir.path().join(".dim.previous").exists());
}

#[test]
fn parquet_tables_append_and_overwrite() {
    run_append_and_overwrite(OutputFormat::Parquet);
}

#[test]
fn csv_tables_append_and_overwrite() {
    run_append_and_overwrite(OutputFormat::Csv);
}

#[test]
fn append_creates_numbered_parts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = FileSink::new(dir.path(), OutputFormat::Parquet);
    let mut frame = df!("id" => [1i64]).expect("frame");
    for _ in 0..3 {
        sink.write_table("facts", &mut frame, WriteMode::Append)
            .expect("append");
    }
    let table_dir = sink.table_dir("facts");
    assert!(table_dir.join("part-00000.parquet").is_file());
    assert!(table_dir.join("part-00002.parquet").is_file());
}

#[test]
fn append_after_missing_part_keeps_existing_parts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = FileSink::new(dir.path(), OutputFormat::Parquet);
    let mut first = df!("id" => [1i64]).expect("frame");
    let mut second = df!("id" => [2i64]).expect("frame");
    let mut third = df!("id" => [3i64]).expect("frame");
    sink.write_table("facts", &mut first, WriteMode::Append)
        .expect("append first");
    sink.write_table("facts", &mut second, WriteMode::Append)
        .expect("append second");

    let table_dir = sink.table_dir("facts");
    fs::remove_file(table_dir.join("part-00000.parquet")).expect("remove first part");
    sink.write_table("facts", &mut third, WriteMode::Append)
        .expect("append third");

    assert!(table_dir.join("part-00002.parquet").is_file());
    let facts = read_table(dir.path(), "facts", OutputFormat::Parquet).expect("read facts");
    assert_eq!(ids(&facts), vec![Some(2), Some(3)]);
}

#[test]
fn overwrite_restores_contents_left_aside() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = FileSink::new(dir.path(), OutputFormat::Csv);
    let mut old = df!("id" => [1i64]).expect("frame");
    sink.write_table("dim", &mut old, WriteMode::Overwrite)
        .expect("overwrite");

    // An interrupted swap: live table moved aside, nothing in its place.
    fs::rename(sink.table_dir("dim"), dir.path().join(".dim.previous")).expect("move aside");
    let restored = read_table(dir.path(), "dim", OutputFormat::Csv);
    assert!(matches!(restored, Err(ReadError::NotFound { .. })));

    let mut new = df!("id" => [2i64]).expect("frame");
    sink.write_table("dim", &mut new, WriteMode::Overwrite)
        .expect("overwrite again");
    let dim = read_table(dir.path(), "dim", OutputFormat::Csv).expect("read dim");
    assert_eq!(ids(&dim), vec![Some(2)]);
    assert!(!dir.path().join(".dim.previous").exists());
}

#[test]
fn leftover_previous_dir_is_cleared() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = FileSink::new(dir.path(), OutputFormat::Parquet);
    let previous = dir.path().join(".dim.previous");
    fs::create_dir_all(&previous).expect("previous dir");
    fs::write(previous.join("part-00000.parquet"), b"stale").expect("stale part");

    let mut frame = df!("id" => [1i64]).expect("frame");
    sink.write_table("dim", &mut frame, WriteMode::Overwrite)
        .expect("first overwrite");
    sink.write_table("dim", &mut frame, WriteMode::Overwrite)
        .expect("second overwrite");
    assert!(!previous.exists());
    let dim = read_table(dir.path(), "dim", OutputFormat::Parquet).expect("read dim");
    assert_eq!(ids(&dim), vec![Some(1)]);
}

#[test]
fn reading_unknown_table_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = read_table(dir.path(), "dim_property", OutputFormat::Parquet).unwrap_err();
    assert!(matches!(err, ReadError::NotFound { .. }));
}
