//! DOCX container access: open a package, extract the structural model,
//! and save a mutated model back without disturbing untouched parts.

mod reader;
mod styles;
mod writer;
mod xml;

use std::io::{Cursor, Read, Write};
use std::path::Path;

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::detect::{detect_format_from_bytes, DocFormat};
use crate::error::{Error, Result};
use crate::model::{DocStatistics, HierarchyEntry, Metadata, Paragraph, StructuralDocument};
use crate::norm::StyleVocabulary;

use reader::{parse_core_properties, parse_document};
use styles::StyleSheet;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const CORE_PART: &str = "docProps/core.xml";

/// Extract the structural model from a DOCX file on disk.
pub fn extract_structure<P: AsRef<Path>>(path: P) -> Result<StructuralDocument> {
    DocxPackage::open(path)?.extract()
}

/// An opened DOCX package.
///
/// Owns the raw archive bytes; the archive is reopened per operation so the
/// package stays cheap to pass around. Saving rewrites only the main
/// document part, and only when something actually changed.
#[derive(Debug)]
pub struct DocxPackage {
    data: Vec<u8>,
}

impl DocxPackage {
    /// Open a package from disk, verifying the container magic.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Wrap in-memory bytes, verifying the container magic and the presence
    /// of the main document part.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if detect_format_from_bytes(&data)? != DocFormat::Docx {
            return Err(Error::UnknownFormat);
        }
        let pkg = Self { data };
        pkg.part(DOCUMENT_PART)?;
        Ok(pkg)
    }

    /// Raw package bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn archive(&self) -> Result<ZipArchive<Cursor<&[u8]>>> {
        Ok(ZipArchive::new(Cursor::new(self.data.as_slice()))?)
    }

    /// Read one archive entry fully.
    fn part(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive()?;
        let mut file = archive
            .by_name(name)
            .map_err(|_| Error::MissingPart(name.to_string()))?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    fn part_optional(&self, name: &str) -> Option<Vec<u8>> {
        self.part(name).ok()
    }

    fn style_sheet(&self) -> Result<StyleSheet> {
        match self.part_optional(STYLES_PART) {
            Some(xml) => StyleSheet::parse(&xml),
            None => Ok(StyleSheet::default()),
        }
    }

    /// Extract the complete structural model.
    pub fn extract(&self) -> Result<StructuralDocument> {
        let sheet = self.style_sheet()?;
        let body = parse_document(&self.part(DOCUMENT_PART)?, &sheet)?;
        let metadata = match self.part_optional(CORE_PART) {
            Some(xml) => parse_core_properties(&xml)?,
            None => Metadata::default(),
        };
        let styles = sheet.catalog();
        let hierarchy = build_hierarchy(&body.paragraphs, &StyleVocabulary::default());
        let statistics = build_statistics(&body.paragraphs);
        debug!(
            "extracted {} paragraphs, {} sections, {} styles",
            body.paragraphs.len(),
            body.sections.len(),
            styles.total()
        );
        Ok(StructuralDocument {
            metadata,
            sections: body.sections,
            paragraphs: body.paragraphs,
            styles,
            hierarchy,
            statistics,
        })
    }

    /// Serialize the model over this package's bytes.
    ///
    /// Every archive entry except a changed `word/document.xml` is copied
    /// raw; a model with no effective changes round-trips the package
    /// byte-identical.
    pub fn to_bytes(&self, doc: &StructuralDocument) -> Result<Vec<u8>> {
        let original_xml = self.part(DOCUMENT_PART)?;
        let sheet = self.style_sheet()?;
        let new_xml = writer::write_document_xml(&original_xml, doc, &sheet)?;
        if new_xml == original_xml {
            return Ok(self.data.clone());
        }
        debug!("document part rewritten ({} bytes)", new_xml.len());

        let mut archive = self.archive()?;
        let mut out = ZipWriter::new(Cursor::new(Vec::new()));
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            if entry.name() == DOCUMENT_PART {
                drop(entry);
                let options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                out.start_file(DOCUMENT_PART, options)?;
                out.write_all(&new_xml)?;
            } else {
                out.raw_copy_file(entry)?;
            }
        }
        Ok(out.finish()?.into_inner())
    }

    /// Write the serialized package to disk.
    pub fn save<P: AsRef<Path>>(&self, doc: &StructuralDocument, dest: P) -> Result<()> {
        let bytes = self.to_bytes(doc)?;
        std::fs::write(dest, bytes)?;
        Ok(())
    }
}

/// Headings in document order, by style-name vocabulary match.
fn build_hierarchy(paragraphs: &[Paragraph], vocabulary: &StyleVocabulary) -> Vec<HierarchyEntry> {
    paragraphs
        .iter()
        .filter(|p| !p.is_empty())
        .filter_map(|p| {
            vocabulary.heading_level(&p.style_name).map(|level| HierarchyEntry {
                paragraph_index: p.index,
                level,
                text: p.text.trim().chars().take(100).collect(),
                style_name: p.style_name.clone(),
            })
        })
        .collect()
}

/// Exact counts over every paragraph and run.
fn build_statistics(paragraphs: &[Paragraph]) -> DocStatistics {
    let mut stats = DocStatistics {
        total_paragraphs: paragraphs.len(),
        ..DocStatistics::default()
    };
    for p in paragraphs {
        if !p.is_empty() {
            stats.non_empty_paragraphs += 1;
            stats.total_words += p.text.split_whitespace().count();
            stats.total_characters += p.text.chars().count();
        }
        for run in &p.runs {
            if let Some(name) = &run.font.name {
                stats.note_font(name);
            }
            if let Some(size) = run.font.size {
                stats.note_size(size);
            }
        }
    }
    if stats.non_empty_paragraphs > 0 {
        let avg = stats.total_words as f64 / stats.non_empty_paragraphs as f64;
        stats.avg_words_per_paragraph = (avg * 10.0).round() / 10.0;
    }
    stats
}
