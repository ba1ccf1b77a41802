use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the series tables.
///
/// Only [`Error::Parse`] is recoverable: the extractor logs it and moves on
/// to the next directory. Everything else aborts the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("column {column} missing from {}", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("could not read {} as DICOM: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
