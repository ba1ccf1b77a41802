//! Series metadata extraction: one CSV row per directory of DICOM files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::attributes::open_forced;
use crate::error::{Error, Result};
use crate::record::SeriesRecord;
use crate::table;

/// Scan `input_dir` and write one [`SeriesRecord`] per series directory
/// to `output_csv`. Returns the number of rows written.
pub fn extract(input_dir: &Path, output_csv: &Path) -> Result<usize> {
    let records = collect_records(input_dir)?;

    info!(
        "Writing {} rows to CSV: {}",
        records.len(),
        output_csv.display()
    );
    table::write_rows(output_csv, &SeriesRecord::HEADER, &records)?;
    Ok(records.len())
}

/// Walk `input_dir` top-down and sample the first eligible file of every
/// directory, including `input_dir` itself.
///
/// Directories without eligible files are skipped. A file that cannot be
/// parsed is logged and its directory skipped.
pub fn collect_records(input_dir: &Path) -> Result<Vec<SeriesRecord>> {
    let metadata = fs::metadata(input_dir).map_err(|source| Error::Io {
        path: input_dir.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(Error::NotADirectory {
            path: input_dir.to_path_buf(),
        });
    }

    let mut records = Vec::new();

    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let Some(first) = eligible_files(entry.path()).into_iter().next() else {
            trace!("No eligible files in {}", entry.path().display());
            continue;
        };
        debug!("Sampling {}", first.display());

        match open_forced(&first) {
            Ok(obj) => records.push(SeriesRecord::from_attributes(&obj)),
            Err(e) => warn!("{}", e),
        }
    }

    Ok(records)
}

/// Whether a file name can hold series data: not hidden and not a JSON sidecar.
pub fn is_eligible(file_name: &str) -> bool {
    !file_name.starts_with('.') && !file_name.ends_with(".json")
}

/// Eligible regular files directly inside `dir`, sorted by file name.
fn eligible_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| is_eligible(&name.to_string_lossy()))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}
