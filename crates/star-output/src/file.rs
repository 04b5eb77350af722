//! Tables stored as directories of part files.
//!
//! Layout under the output root:
//!
//! ```text
//! <root>/<table>/part-00000.parquet
//! <root>/<table>/part-00001.parquet
//! ```
//!
//! `Append` adds a part numbered one past the highest existing part and never
//! writes over an existing file. `Overwrite` writes the new table into a
//! staging directory, moves the old directory aside, and renames staging into
//! place; the old contents are restored if that rename fails and removed once
//! it succeeded. Part files are written under a temporary name and renamed
//! once fully encoded.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::{
    CsvReadOptions, CsvWriter, DataFrame, ParquetReader, ParquetWriter, SerReader, SerWriter,
};
use star_model::{OutputFormat, SinkError, TableSink, WriteMode};
use tracing::{debug, warn};

use crate::error::ReadError;

const PART_PREFIX: &str = "part-";

#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn table_dir(&self, table: &str) -> PathBuf {
        self.root.join(table)
    }

    fn append(&self, table: &str, frame: &mut DataFrame) -> Result<PathBuf, SinkError> {
        let table_dir = self.table_dir(table);
        fs::create_dir_all(&table_dir).map_err(|source| io_error(table, &table_dir, source))?;
        let existing =
            part_files(&table_dir, self.format).map_err(|source| io_error(table, &table_dir, source))?;
        let next = existing
            .iter()
            .filter_map(|part| part_index(part))
            .max()
            .map_or(0, |last| last + 1);
        let part = table_dir.join(part_name(next, self.format));
        self.write_part(table, &part, frame)?;
        Ok(part)
    }

    fn overwrite(&self, table: &str, frame: &mut DataFrame) -> Result<PathBuf, SinkError> {
        let table_dir = self.table_dir(table);
        let staging = self.root.join(format!(".{table}.staging"));
        let previous = self.root.join(format!(".{table}.previous"));
        recover_previous(table, &table_dir, &previous)?;

        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|source| io_error(table, &staging, source))?;
        }
        fs::create_dir_all(&staging).map_err(|source| io_error(table, &staging, source))?;
        self.write_part(table, &staging.join(part_name(0, self.format)), frame)?;

        let moved_aside = table_dir.exists();
        if moved_aside {
            fs::rename(&table_dir, &previous)
                .map_err(|source| io_error(table, &table_dir, source))?;
        }
        if let Err(source) = fs::rename(&staging, &table_dir) {
            if moved_aside && let Err(restore) = fs::rename(&previous, &table_dir) {
                warn!(
                    table,
                    path = %previous.display(),
                    error = %restore,
                    "previous table contents left aside"
                );
            }
            return Err(io_error(table, &table_dir, source));
        }
        if moved_aside && let Err(error) = fs::remove_dir_all(&previous) {
            warn!(table, path = %previous.display(), %error, "stale table contents not removed");
        }
        Ok(table_dir.join(part_name(0, self.format)))
    }

    fn write_part(&self, table: &str, path: &Path, frame: &mut DataFrame) -> Result<(), SinkError> {
        if path.exists() {
            return Err(SinkError::Rejected {
                table: table.to_string(),
                message: format!("part file {} already exists", path.display()),
            });
        }
        let temp = path.with_extension(format!("{}.tmp", self.format.extension()));
        let mut file = File::create(&temp).map_err(|source| io_error(table, &temp, source))?;
        let encoded = match self.format {
            OutputFormat::Parquet => ParquetWriter::new(&mut file).finish(frame).map(|_| ()),
            OutputFormat::Csv => CsvWriter::new(&mut file).include_header(true).finish(frame),
        };
        drop(file);
        if let Err(source) = encoded {
            let _ = fs::remove_file(&temp);
            return Err(SinkError::Encode {
                table: table.to_string(),
                source,
            });
        }
        fs::rename(&temp, path).map_err(|source| io_error(table, path, source))
    }
}

impl TableSink for FileSink {
    fn write_table(
        &mut self,
        table: &str,
        frame: &mut DataFrame,
        mode: WriteMode,
    ) -> Result<(), SinkError> {
        fs::create_dir_all(&self.root).map_err(|source| io_error(table, &self.root, source))?;
        let part = match mode {
            WriteMode::Append => self.append(table, frame)?,
            WriteMode::Overwrite => self.overwrite(table, frame)?,
        };
        debug!(
            table,
            %mode,
            rows = frame.height(),
            path = %part.display(),
            "table part written"
        );
        Ok(())
    }
}

fn io_error(table: &str, path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        table: table.to_string(),
        path: path.to_path_buf(),
        source,
    }
}

/// Put back table contents an interrupted overwrite moved aside, or drop
/// them when the live table is already in place.
fn recover_previous(table: &str, table_dir: &Path, previous: &Path) -> Result<(), SinkError> {
    if !previous.exists() {
        return Ok(());
    }
    if table_dir.exists() {
        fs::remove_dir_all(previous).map_err(|source| io_error(table, previous, source))
    } else {
        fs::rename(previous, table_dir).map_err(|source| io_error(table, previous, source))
    }
}

fn part_index(path: &Path) -> Option<usize> {
    path.file_stem()?
        .to_str()?
        .strip_prefix(PART_PREFIX)?
        .parse()
        .ok()
}

fn part_name(index: usize, format: OutputFormat) -> String {
    format!("{PART_PREFIX}{index:05}.{}", format.extension())
}

/// Part files of a table directory, sorted by name.
fn part_files(dir: &Path, format: OutputFormat) -> std::io::Result<Vec<PathBuf>> {
    let mut parts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_part = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(PART_PREFIX))
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == format.extension());
        if is_part && path.is_file() {
            parts.push(path);
        }
    }
    parts.sort();
    Ok(parts)
}

/// Load a stored table by concatenating its part files in order.
pub fn read_table(root: &Path, table: &str, format: OutputFormat) -> Result<DataFrame, ReadError> {
    let dir = root.join(table);
    if !dir.is_dir() {
        return Err(ReadError::NotFound { path: dir });
    }
    let parts = part_files(&dir, format).map_err(|source| ReadError::Io {
        path: dir.clone(),
        source,
    })?;
    let mut combined: Option<DataFrame> = None;
    for part in parts {
        let frame = read_part(&part, format)?;
        match combined.as_mut() {
            Some(existing) => {
                existing
                    .vstack_mut(&frame)
                    .map_err(|source| ReadError::Decode {
                        path: part.clone(),
                        source,
                    })?;
            }
            None => combined = Some(frame),
        }
    }
    Ok(combined.unwrap_or_else(DataFrame::empty))
}

fn read_part(path: &Path, format: OutputFormat) -> Result<DataFrame, ReadError> {
    let decode_error = |source| ReadError::Decode {
        path: path.to_path_buf(),
        source,
    };
    match format {
        OutputFormat::Parquet => {
            let file = File::open(path).map_err(|source| ReadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            ParquetReader::new(file).finish().map_err(decode_error)
        }
        OutputFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(decode_error)?
            .finish()
            .map_err(decode_error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_names_are_zero_padded() {
        assert_eq!(part_name(3, OutputFormat::Parquet), "part-00003.parquet");
        assert_eq!(part_name(12, OutputFormat::Csv), "part-00012.csv");
    }

    #[test]
    fn part_index_parses_names() {
        assert_eq!(part_index(Path::new("t/part-00007.parquet")), Some(7));
        assert_eq!(part_index(Path::new("t/other.parquet")), None);
    }

    #[test]
    fn temporary_parts_are_not_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("part-00000.parquet"), b"").expect("write");
        fs::write(dir.path().join("part-00001.parquet.tmp"), b"").expect("write");
        fs::write(dir.path().join("part-00002.csv"), b"").expect("write");
        let parts = part_files(dir.path(), OutputFormat::Parquet).expect("list");
        assert_eq!(parts.len(), 1);
    }
}
