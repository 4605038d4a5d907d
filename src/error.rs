//! Error types for the docnorm library.

use std::io;
use thiserror::Error;

/// Result type alias for docnorm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document analysis and repair.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The file format is not recognized as a supported document type.
    #[error("Unknown file format: not a DOCX or PDF document")]
    UnknownFormat,

    /// Error parsing a document container (ZIP/XML/PDF structure).
    #[error("Document parsing error: {0}")]
    Parse(String),

    /// A required archive part or document object is missing.
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Fixed-layout conversion failed, timed out, or is not installed.
    #[error("Render unavailable: {0}")]
    RenderUnavailable(String),

    /// An action's target selector is malformed or out of range.
    #[error("{0}")]
    TargetResolution(String),

    /// Generic error with message, for converter and reviewer implementations.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Parse(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::MissingPart("archive entry".to_string())
            }
            _ => Error::Parse(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
