// src/stats/read_set_stats.rs

use std::fmt::Write as _;

use super::error_profile::{ErrorProfile, KMER_THRESHOLDS};
use super::Histogram;
use crate::config::{ReadCategory, ReadType};
use crate::merge::ReadProfile;

/// Perfect k-mer counts for one aligned read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerRow {
    pub id: String,
    pub length: usize,
    pub k_counts: [usize; 6],
}

/// Counters across every file of a run, independent of reference.
#[derive(Debug, Clone, Default)]
pub struct ReadSetStats {
    pub files_processed: u64,
    pub pass_files: u64,
    pub fail_files: u64,
    pub reads_with_alignments: u64,
    pub reads_without_alignments: u64,
    pub failed_files: u64,
    best_perfect_kmers: Histogram,
    cumulative_best_perfect_kmers: Histogram,
    errors: ErrorProfile,
    kmer_rows: Vec<KmerRow>,
}

impl ReadSetStats {
    pub fn add_read_file(&mut self, category: ReadCategory) {
        self.files_processed += 1;
        match category {
            ReadCategory::Pass => self.pass_files += 1,
            ReadCategory::Fail => self.fail_files += 1,
            ReadCategory::Unknown => {}
        }
    }

    pub fn add_read_with_alignment(&mut self, read: &ReadProfile) {
        self.reads_with_alignments += 1;
        let best = read.summary.longest_perfect_kmer();
        self.best_perfect_kmers.add(best);
        self.cumulative_best_perfect_kmers.add_cumulative(best);
        for event in &read.events {
            self.errors.observe(event);
        }
        self.kmer_rows.push(KmerRow {
            id: read.summary.query_id.clone(),
            length: read.summary.query_size,
            k_counts: read.summary.kmers.k_counts,
        });
    }

    pub fn add_read_without_alignment(&mut self) {
        self.reads_without_alignments += 1;
    }

    pub fn add_failed_file(&mut self) {
        self.failed_files += 1;
    }

    /// Fold counts gathered on another thread into this one.
    pub fn merge(&mut self, mut other: ReadSetStats) {
        self.files_processed += other.files_processed;
        self.pass_files += other.pass_files;
        self.fail_files += other.fail_files;
        self.reads_with_alignments += other.reads_with_alignments;
        self.reads_without_alignments += other.reads_without_alignments;
        self.failed_files += other.failed_files;
        self.best_perfect_kmers.merge(&other.best_perfect_kmers);
        self.cumulative_best_perfect_kmers
            .merge(&other.cumulative_best_perfect_kmers);
        self.errors.merge(&other.errors);
        self.kmer_rows.append(&mut other.kmer_rows);
    }

    pub fn reads(&self) -> u64 {
        self.reads_with_alignments + self.reads_without_alignments
    }

    pub fn percent_reads_with_alignments(&self) -> f64 {
        percent(self.reads_with_alignments, self.reads())
    }

    pub fn percent_reads_without_alignments(&self) -> f64 {
        percent(self.reads_without_alignments, self.reads())
    }

    pub fn errors(&self) -> &ErrorProfile {
        &self.errors
    }

    pub fn best_perfect_kmers(&self) -> &Histogram {
        &self.best_perfect_kmers
    }

    pub fn cumulative_best_perfect_kmers(&self) -> &Histogram {
        &self.cumulative_best_perfect_kmers
    }

    pub fn kmer_rows(&self) -> &[KmerRow] {
        &self.kmer_rows
    }

    /// Put the per-read rows in read ID order. Parallel runs collect them in
    /// whatever order the threads finished.
    pub fn sort_kmer_rows(&mut self) {
        self.kmer_rows.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// `Id\tLength\tnk15..nk25`, one line per aligned read.
    pub fn kmers_text(&self) -> String {
        let mut output = String::from("Id\tLength");
        for k in KMER_THRESHOLDS {
            let _ = write!(output, "\tnk{}", k);
        }
        output.push('\n');
        for row in &self.kmer_rows {
            let _ = write!(output, "{}\t{}", row.id, row.length);
            for c in row.k_counts {
                let _ = write!(output, "\t{}", c);
            }
            output.push('\n');
        }
        output
    }

    pub fn summary_text(&self, read_type: ReadType) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "{} alignments\n", read_type.name());
        let _ = writeln!(output, "Num read files: {}", self.files_processed);
        let _ = writeln!(output, "Num pass files: {}", self.pass_files);
        let _ = writeln!(output, "Num fail files: {}", self.fail_files);
        let _ = writeln!(output, "Num failed to profile: {}", self.failed_files);
        let _ = writeln!(output, "Num reads: {}", self.reads());
        let _ = writeln!(
            output,
            "Num reads with alignments: {} ({:.2}%)",
            self.reads_with_alignments,
            self.percent_reads_with_alignments()
        );
        let _ = writeln!(
            output,
            "Num reads without alignments: {} ({:.2}%)",
            self.reads_without_alignments,
            self.percent_reads_without_alignments()
        );
        output
    }
}

fn percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        100.0 * numerator as f64 / denominator as f64
    }
}
