//! CSV input and output shared by the three stages.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// A CSV row keyed by column name.
pub type Row = HashMap<String, String>;

/// Read every row of a headed CSV file.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let csv_error = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    reader
        .deserialize::<Row>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_error)
}

/// Value of a column that every row must carry.
pub fn required<'r>(row: &'r Row, column: &'static str, path: &Path) -> Result<&'r str> {
    row.get(column)
        .map(String::as_str)
        .ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column,
        })
}

/// Write `header` followed by one line per row, replacing any existing file.
///
/// The header is written even when there are no rows.
pub fn write_rows<T, I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let csv_error = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[derive(Serialize)]
    struct Pair {
        name: String,
        value: u8,
    }

    #[test]
    fn header_is_written_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_rows(&path, &["name", "value"], Vec::<Pair>::new()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,value\n");
    }

    #[test]
    fn separators_inside_values_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        let rows = vec![Pair {
            name: "a, b; c".to_string(),
            value: 1,
        }];

        write_rows(&path, &["name", "value"], rows).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name,value\n\"a, b; c\",1\n"
        );

        let read = read_rows(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0]["name"], "a, b; c");
        assert_eq!(read[0]["value"], "1");
    }

    #[test]
    fn empty_cells_read_as_empty_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.csv");
        fs::write(&path, "PatientID,StudyDate\nP1,\n").unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(required(&rows[0], "PatientID", &path).unwrap(), "P1");
        assert_eq!(rows[0]["StudyDate"], "");
        assert!(matches!(
            required(&rows[0], "SeriesDescription", &path),
            Err(Error::MissingColumn { column: "SeriesDescription", .. })
        ));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_rows(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, Error::Csv { .. }));
    }
}
