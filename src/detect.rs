//! Input format detection for documents handed to the pipeline.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Document formats the pipeline can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    /// Office Open XML word-processing document (ZIP container).
    Docx,
    /// Fixed-layout page-description document.
    Pdf,
}

impl std::fmt::Display for DocFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocFormat::Docx => write!(f, "DOCX"),
            DocFormat::Pdf => write!(f, "PDF"),
        }
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the document format from a file path.
///
/// Reads the first bytes only; a ZIP container is reported as [`DocFormat::Docx`]
/// (the DOCX-specific parts are verified when the archive is opened).
///
/// # Returns
/// * `Ok(DocFormat)` if the header matches a supported format
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocFormat> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    let n = reader.read(&mut header)?;
    detect_format_from_bytes(&header[..n])
}

/// Detect the document format from leading bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocFormat> {
    if data.starts_with(PDF_MAGIC) {
        return Ok(DocFormat::Pdf);
    }
    if data.starts_with(ZIP_MAGIC) {
        return Ok(DocFormat::Docx);
    }
    Err(Error::UnknownFormat)
}

/// Check if a file looks like a DOCX container.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(DocFormat::Docx))
}

/// Check if a file looks like a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(DocFormat::Pdf))
}
