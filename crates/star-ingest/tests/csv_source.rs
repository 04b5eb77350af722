//! Tests for CSV batch reading and input discovery.

use std::fs;

use polars::prelude::DataType;
use star_ingest::{CsvSource, MemorySource, list_csv_files};
use star_model::{RecordSource, SourceError};

const HEADER: &str = "property_id,price,city,garden,previous_owners";

#[test]
fn reads_batch_with_inferred_types() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("data_01.csv"),
        format!("{HEADER}\n1,250000.5,Porto,1,2\n2,180000,Lisbon,0,\n"),
    )
    .expect("write csv");

    let source = CsvSource::new(dir.path());
    let frame = source.read_batch("data_01.csv").expect("read batch");

    assert_eq!(frame.height(), 2);
    assert_eq!(
        frame.get_column_names_str(),
        vec!["property_id", "price", "city", "garden", "previous_owners"]
    );
    assert_eq!(frame.column("property_id").expect("id").dtype(), &DataType::Int64);
    assert_eq!(frame.column("price").expect("price").dtype(), &DataType::Float64);
    assert_eq!(frame.column("city").expect("city").dtype(), &DataType::String);
    assert_eq!(frame.column("previous_owners").expect("owners").null_count(), 1);
}

#[test]
fn late_decimal_makes_a_float_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut text = format!("{HEADER}\n");
    for row in 0..10_500 {
        let price = if row == 10_200 { "250000.5" } else { "250000" };
        text.push_str(&format!("{row},{price},Porto,1,0\n"));
    }
    fs::write(dir.path().join("data_01.csv"), text).expect("write csv");

    let frame = CsvSource::new(dir.path())
        .read_batch("data_01.csv")
        .expect("read batch");
    assert_eq!(frame.height(), 10_500);
    let price = frame.column("price").expect("price");
    assert_eq!(price.dtype(), &DataType::Float64);
    assert_eq!(price.f64().expect("f64").get(10_200), Some(250_000.5));
}

#[test]
fn bounded_inference_rejects_late_decimal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut text = format!("{HEADER}\n");
    for row in 0..20 {
        let price = if row == 15 { "250000.5" } else { "250000" };
        text.push_str(&format!("{row},{price},Porto,1,0\n"));
    }
    fs::write(dir.path().join("data_01.csv"), text).expect("write csv");

    let err = CsvSource::new(dir.path())
        .with_infer_schema_rows(Some(5))
        .read_batch("data_01.csv")
        .unwrap_err();
    assert!(matches!(err, SourceError::Read { .. }));
}

#[test]
fn missing_batch_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = CsvSource::new(dir.path());
    let err = source.read_batch("data_99.csv").unwrap_err();
    assert!(matches!(err, SourceError::FileNotFound { .. }));
}

#[test]
fn lists_csv_files_in_name_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["data_10.csv", "data_02.csv", "notes.txt", "data_01.CSV"] {
        fs::write(dir.path().join(name), HEADER).expect("write file");
    }
    fs::create_dir(dir.path().join("nested.csv")).expect("create dir");

    let files = list_csv_files(dir.path()).expect("list files");
    assert_eq!(files, vec!["data_01.CSV", "data_02.csv", "data_10.csv"]);
}

#[test]
fn listing_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = list_csv_files(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, SourceError::DirectoryRead { .. }));
}

#[test]
fn memory_source_returns_named_batches() {
    let frame = polars::df!("property_id" => [1i64, 2]).expect("frame");
    let source = MemorySource::new().with_batch("chunk_1", frame);
    assert_eq!(source.batch_ids(), vec!["chunk_1".to_string()]);
    assert_eq!(source.read_batch("chunk_1").expect("batch").height(), 2);
    assert!(matches!(
        source.read_batch("chunk_2"),
        Err(SourceError::NotFound { .. })
    ));
}
