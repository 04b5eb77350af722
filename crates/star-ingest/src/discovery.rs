//! Input batch discovery.

use std::path::Path;

use star_model::SourceError;

/// Lists the CSV batch names in a directory.
///
/// Returns file names (not paths) sorted by name, which is the order batches
/// are processed in.
pub fn list_csv_files(dir: &Path) -> Result<Vec<String>, SourceError> {
    let read_error = |source| SourceError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };
    let entries = std::fs::read_dir(dir).map_err(read_error)?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(read_error)?.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            files.push(name.to_string());
        }
    }
    files.sort();
    Ok(files)
}
