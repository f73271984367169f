use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid Excel file: {path} ({details})")]
    InvalidExcel { path: PathBuf, details: String },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("workbook has no sheets: {0}")]
    NoSheets(PathBuf),

    #[error("column \"{column}\" not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("cannot render barcode \"{code}\": {details}")]
    Barcode { code: String, details: String },

    #[error("failed to build PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to write listing: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FileNotFound(_) => 1,
            Error::InvalidExcel { .. } => 2,
            Error::UnsupportedFormat(_) => 3,
            Error::NoSheets(_) => 3,
            Error::MissingColumn { .. } => 3,
            Error::Pdf(_) => 4,
            Error::CsvWrite(_) => 4,
            Error::Barcode { .. } => 5,
            Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
