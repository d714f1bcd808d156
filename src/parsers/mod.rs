// src/parsers/mod.rs

pub mod cigar;
pub mod maf;
pub mod sam;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::config::{Aligner, AlignmentFormat};
use crate::error::{ParseError, ProfileError, Result};
use crate::references::ReferenceRegistry;
use crate::types::AlignmentFragment;

pub use maf::parse_maf;
pub use sam::parse_sam;

/// Decode aligner output already held in memory.
pub fn parse_alignments(
    text: &str,
    aligner: Aligner,
    references: &ReferenceRegistry,
) -> std::result::Result<Vec<AlignmentFragment>, ParseError> {
    match aligner.format() {
        AlignmentFormat::Maf => parse_maf(text),
        AlignmentFormat::Sam => parse_sam(text, aligner, references),
    }
}

/// Read and decode one alignment file (`.gz` handled transparently).
pub fn read_alignment_file<P: AsRef<Path>>(
    path: P,
    aligner: Aligner,
    references: &ReferenceRegistry,
) -> Result<Vec<AlignmentFragment>> {
    let path = path.as_ref();
    let wrap = |source: ParseError| ProfileError::Parse {
        file: path.to_path_buf(),
        source,
    };

    let text = read_text(path).map_err(|e| wrap(ParseError::Io(e)))?;
    parse_alignments(&text, aligner, references).map_err(wrap)
}

fn read_text(path: &Path) -> std::io::Result<String> {
    let f = File::open(path)?;
    let is_gz = path.extension().map(|ext| ext == "gz").unwrap_or(false);

    let mut reader: Box<dyn Read> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}
