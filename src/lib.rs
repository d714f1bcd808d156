// src/lib.rs
pub mod alignments_table;
pub mod config;
pub mod error;
pub mod merge;
pub mod parsers;
pub mod profile;
pub mod references;
pub mod reports;
pub mod stats;
pub mod types;

use std::path::{Path, PathBuf};

pub use crate::config::{Aligner, AlignmentFormat, ProfileOptions, ReadCategory, ReadType, TieBreak};
pub use crate::error::{ParseError, ProfileError, Result};
pub use crate::profile::{profile_alignment_file, profile_alignment_files, FileOutcome, ProfileResults};
pub use crate::references::{ReferenceRegistry, ReferenceSequence};
pub use crate::reports::Report;
pub use crate::types::{AlignmentFragment, ErrorEvent, MergedAlignmentSummary, Strand};

/// Results of a whole analysis: the batch results plus the references
/// holding per-reference stats. Text is generated on demand.
pub struct AnalysisResults {
    pub references: ReferenceRegistry,
    pub results: ProfileResults,
    pub options: ProfileOptions,
}

impl AnalysisResults {
    pub fn get_alignments_text(&self) -> String {
        self.results.get_alignments_text()
    }

    pub fn get_reference_summary_text(&self) -> String {
        reports::reference_summary_text(&self.references, self.options.read_type)
    }

    /// Every report for this run, named relative to an output directory.
    pub fn reports(&self) -> Vec<Report> {
        let prefix = format!("all_{}", self.options.read_type.name());
        let mut all = vec![
            Report {
                name: format!("{}_alignments.txt", prefix),
                text: self.get_alignments_text(),
            },
            Report {
                name: format!("{}_reference_summary.txt", prefix),
                text: self.get_reference_summary_text(),
            },
        ];
        if !self.results.failures.is_empty() {
            all.push(Report {
                name: format!("{}_failed_files.txt", prefix),
                text: self.results.get_failures_text(),
            });
        }
        all.extend(reports::read_set_reports(&self.results.read_set, &self.options));
        for reference in self.references.iter() {
            all.extend(reports::reference_reports(reference, &self.options));
        }
        all
    }

    /// Write every report under `dir`, creating sub-directories as needed.
    pub fn write_reports<P: AsRef<Path>>(&self, dir: P) -> Result<usize> {
        let dir = dir.as_ref();
        let reports = self.reports();
        for report in &reports {
            let path = dir.join(&report.name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &report.text)?;
        }
        log::info!("Wrote {} reports to {}", reports.len(), dir.display());
        Ok(reports.len())
    }
}

/// Alignment files in `dir` with the aligner's extension (optionally `.gz`),
/// sorted by name.
pub fn find_alignment_files<P: AsRef<Path>>(dir: P, aligner: Aligner) -> Result<Vec<PathBuf>> {
    let ext = aligner.file_extension();
    let gz_ext = format!("{}.gz", ext);
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
            continue;
        };
        if path.is_file() && (name.ends_with(ext) || name.ends_with(&gz_ext)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load the references, then profile every alignment file against them.
pub fn analyse_alignments<P: AsRef<Path>>(
    reference_path: P,
    alignment_files: &[PathBuf],
    options: ProfileOptions,
) -> Result<AnalysisResults> {
    let references = ReferenceRegistry::from_fasta(reference_path)?;
    let results = profile_alignment_files(alignment_files, &references, &options)?;
    Ok(AnalysisResults {
        references,
        results,
        options,
    })
}
