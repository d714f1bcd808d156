// src/reports.rs

//! Named text reports, ready to be written one per file.

use crate::config::{ProfileOptions, ReadType};
use crate::references::{ReferenceRegistry, ReferenceSequence};
use crate::stats::{ErrorProfile, LogoSelection, ReadSetStats, MOTIF_SIZES};
use crate::types::EventKind;

/// A report file name (relative to the output directory) and its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub name: String,
    pub text: String,
}

impl Report {
    fn new(name: String, text: String) -> Self {
        Self { name, text }
    }
}

/// Per-reference reports for one read type. References no read aligned to
/// produce nothing.
pub fn reference_reports(reference: &ReferenceSequence, options: &ProfileOptions) -> Vec<Report> {
    let stats = reference.stats(options.read_type);
    if stats.reads_with_alignments() == 0 {
        return Vec::new();
    }

    let prefix = format!("{}/{}_{}", reference.id, reference.id, options.read_type.name());
    vec![
        Report::new(format!("{}_coverage.txt", prefix), stats.coverage_text(options.coverage_bin_size)),
        Report::new(format!("{}_perfect_kmers.txt", prefix), stats.perfect_kmers_text()),
        Report::new(format!("{}_best_perfect_kmers.txt", prefix), stats.best_perfect_kmers_text()),
        Report::new(
            format!("{}_cumulative_perfect_kmers.txt", prefix),
            stats.cumulative_perfect_kmers_text(),
        ),
        Report::new(format!("{}_insertions.txt", prefix), stats.errors().insertion_size_text()),
        Report::new(format!("{}_deletions.txt", prefix), stats.errors().deletion_size_text()),
        Report::new(
            format!("{}_substitutions_percent.txt", prefix),
            stats.errors().substitution_percent_text(),
        ),
        Report::new(format!("{}_error_summary.txt", prefix), stats.error_summary_text()),
    ]
}

/// `Id Size ReadsAlign LongPerfKm` table over every reference, sorted by ID.
pub fn reference_summary_text(references: &ReferenceRegistry, read_type: ReadType) -> String {
    let width = references
        .iter()
        .map(|r| r.id.len())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut sorted: Vec<_> = references.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut output = format!(
        "{:<width$} {:<12} {:<10} {:<10}\n",
        "Id",
        "Size",
        "ReadsAlign",
        "LongPerfKm",
        width = width
    );
    for reference in sorted {
        output.push_str(&reference.stats(read_type).summary_line(width));
        output.push('\n');
    }
    output
}

/// Motif tables and base-count matrices from an error profile.
pub fn motif_reports(prefix: &str, errors: &ErrorProfile, logo_motifs: usize) -> Vec<Report> {
    let mut reports = Vec::new();
    for kind in EventKind::ALL {
        for k in MOTIF_SIZES {
            let Some(table) = errors.motifs().get(kind, k) else {
                continue;
            };
            let stem = format!("{}_{}_{}mer", prefix, kind.name(), k);
            reports.push(Report::new(format!("{}_motifs.txt", stem), table.percent_text()));
            for (label, selection) in [
                ("top", LogoSelection::Top(logo_motifs)),
                ("bottom", LogoSelection::Bottom(logo_motifs)),
            ] {
                reports.push(Report::new(
                    format!("{}_{}{}_logo.txt", stem, label, logo_motifs),
                    base_counts_text(&table.base_counts(selection)),
                ));
            }
        }
    }
    reports
}

fn base_counts_text(counts: &[Vec<u64>; 4]) -> String {
    let mut output = String::new();
    for (base, row) in ['A', 'C', 'G', 'T'].iter().zip(counts) {
        output.push(*base);
        for c in row {
            output.push('\t');
            output.push_str(&c.to_string());
        }
        output.push('\n');
    }
    output
}

/// Read-set wide reports: summary, k-mer rows, substitutions and motifs.
pub fn read_set_reports(read_set: &ReadSetStats, options: &ProfileOptions) -> Vec<Report> {
    let prefix = format!("all_{}", options.read_type.name());
    let mut reports = vec![
        Report::new(format!("{}_summary.txt", prefix), read_set.summary_text(options.read_type)),
        Report::new(format!("{}_kmers.txt", prefix), read_set.kmers_text()),
        Report::new(
            format!("{}_substitutions_percent.txt", prefix),
            read_set.errors().substitution_percent_text(),
        ),
        Report::new(format!("{}_insertions.txt", prefix), read_set.errors().insertion_size_text()),
        Report::new(format!("{}_deletions.txt", prefix), read_set.errors().deletion_size_text()),
    ];
    reports.extend(motif_reports(&prefix, read_set.errors(), options.logo_motifs));
    reports
}
