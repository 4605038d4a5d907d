//! Visual layout extraction from fixed-layout documents.
//!
//! [`read_layout`] opens a rendered PDF and returns the [`VisualLayout`]
//! model: per page, every text span with its bounding box in points and
//! every image block. Page extraction runs in parallel by rayon unless the
//! caller opts out.

mod backend;
mod convert;
pub mod layout;

pub use backend::{LopdfBackend, PdfBackend};
pub use convert::{LayoutConverter, SofficeConverter};

use std::path::Path;

use rayon::prelude::*;

use crate::error::Result;
use crate::model::{VisualLayout, VisualPage};

/// Read the visual layout of a PDF file.
pub fn read_layout<P: AsRef<Path>>(path: P) -> Result<VisualLayout> {
    read_layout_with(path, true)
}

/// Read the visual layout, optionally disabling parallel page extraction.
pub fn read_layout_with<P: AsRef<Path>>(path: P, parallel: bool) -> Result<VisualLayout> {
    let backend = LopdfBackend::open(path)?;
    layout_from_backend(&backend, parallel)
}

/// Build the layout model from any backend.
pub fn layout_from_backend(backend: &dyn PdfBackend, parallel: bool) -> Result<VisualLayout> {
    let count = backend.page_count();

    let pages: Vec<VisualPage> = if parallel {
        (1..=count)
            .into_par_iter()
            .map(|n| backend.read_page(n))
            .collect::<Result<_>>()?
    } else {
        (1..=count)
            .map(|n| backend.read_page(n))
            .collect::<Result<_>>()?
    };

    log::debug!("read visual layout: {} pages", pages.len());

    Ok(VisualLayout::new(pages))
}
