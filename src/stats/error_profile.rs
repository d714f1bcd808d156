// src/stats/error_profile.rs

use std::fmt::Write as _;

use super::motifs::MotifStatistics;
use super::Histogram;
use crate::types::{ErrorEvent, EventKind};

/// Perfect k-mer thresholds reported per read (`nk15` .. `nk25`).
pub const KMER_THRESHOLDS: [usize; 6] = [15, 17, 19, 21, 23, 25];

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Map a nucleotide to its row/column in the substitution matrix.
#[inline]
pub fn base_index(b: u8) -> Option<usize> {
    match b {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Running perfect k-mer bookkeeping for one merged read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerfectKmerTally {
    /// Sum of all perfect run lengths
    pub total: usize,
    /// Number of perfect runs
    pub count: usize,
    pub longest: usize,
    /// Runs at least `KMER_THRESHOLDS[i]` long
    pub k_counts: [usize; 6],
}

impl PerfectKmerTally {
    pub fn observe(&mut self, length: usize) {
        self.total += length;
        self.count += 1;
        self.longest = self.longest.max(length);
        for (threshold, count) in KMER_THRESHOLDS.iter().zip(self.k_counts.iter_mut()) {
            if length >= *threshold {
                *count += 1;
            }
        }
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }

    /// Tab-separated `nk15..nk25` columns.
    pub fn k_counts_text(&self) -> String {
        self.k_counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// Indel, substitution and motif counters fed by `ErrorEvent`s.
#[derive(Debug, Clone, Default)]
pub struct ErrorProfile {
    pub insertion_count: u64,
    pub deletion_count: u64,
    /// Every substitution event, recognised bases or not
    pub substitution_count: u64,
    /// Substitutions that made it into the matrix
    pub matrix_substitutions: u64,
    pub inserted_bases: u64,
    pub deleted_bases: u64,
    insertion_sizes: Histogram,
    deletion_sizes: Histogram,
    substitution_matrix: [[u64; 4]; 4],
    motifs: MotifStatistics,
}

impl ErrorProfile {
    pub fn observe(&mut self, event: &ErrorEvent) {
        match event {
            ErrorEvent::Insertion { size, context } => {
                self.observe_indel(EventKind::Insertion, *size, context)
            }
            ErrorEvent::Deletion { size, context } => {
                self.observe_indel(EventKind::Deletion, *size, context)
            }
            ErrorEvent::Substitution {
                context,
                ref_base,
                read_base,
            } => self.observe_substitution(context, *ref_base, *read_base),
        }
    }

    pub fn observe_indel(&mut self, kind: EventKind, size: usize, context: &str) {
        match kind {
            EventKind::Insertion => {
                self.insertion_count += 1;
                self.inserted_bases += size as u64;
                self.insertion_sizes.add(size);
            }
            EventKind::Deletion => {
                self.deletion_count += 1;
                self.deleted_bases += size as u64;
                self.deletion_sizes.add(size);
            }
            EventKind::Substitution => {
                log::warn!("Substitution passed as an indel, ignored");
                return;
            }
        }
        self.motifs.add(kind, context);
    }

    pub fn observe_substitution(&mut self, context: &str, ref_base: u8, read_base: u8) {
        self.substitution_count += 1;
        self.motifs.add(EventKind::Substitution, context);

        match (base_index(ref_base), base_index(read_base)) {
            (Some(r), Some(s)) => {
                self.substitution_matrix[r][s] += 1;
                self.matrix_substitutions += 1;
            }
            _ => log::warn!(
                "Unknown base in substitution ({} -> {}), not counted in matrix",
                ref_base as char,
                read_base as char
            ),
        }
    }

    /// Add another profile's counts into this one.
    pub fn merge(&mut self, other: &ErrorProfile) {
        self.insertion_count += other.insertion_count;
        self.deletion_count += other.deletion_count;
        self.substitution_count += other.substitution_count;
        self.matrix_substitutions += other.matrix_substitutions;
        self.inserted_bases += other.inserted_bases;
        self.deleted_bases += other.deleted_bases;
        self.insertion_sizes.merge(&other.insertion_sizes);
        self.deletion_sizes.merge(&other.deletion_sizes);
        for (row, theirs) in self.substitution_matrix.iter_mut().zip(&other.substitution_matrix) {
            for (count, t) in row.iter_mut().zip(theirs) {
                *count += t;
            }
        }
        self.motifs.merge(&other.motifs);
    }

    pub fn count(&self, kind: EventKind) -> u64 {
        match kind {
            EventKind::Insertion => self.insertion_count,
            EventKind::Deletion => self.deletion_count,
            EventKind::Substitution => self.substitution_count,
        }
    }

    pub fn substitution(&self, ref_base: u8, read_base: u8) -> u64 {
        match (base_index(ref_base), base_index(read_base)) {
            (Some(r), Some(s)) => self.substitution_matrix[r][s],
            _ => 0,
        }
    }

    pub fn insertion_sizes(&self) -> &Histogram {
        &self.insertion_sizes
    }

    pub fn deletion_sizes(&self) -> &Histogram {
        &self.deletion_sizes
    }

    pub fn motifs(&self) -> &MotifStatistics {
        &self.motifs
    }

    pub fn mean_insertion_size(&self) -> f64 {
        mean(self.inserted_bases, self.insertion_count)
    }

    pub fn mean_deletion_size(&self) -> f64 {
        mean(self.deleted_bases, self.deletion_count)
    }

    /// Substitution matrix as percentages of all recognised substitutions.
    pub fn substitution_percent_text(&self) -> String {
        let mut output = String::from("\tSubA\tSubC\tSubG\tSubT\n");
        for (r, row) in self.substitution_matrix.iter().enumerate() {
            output.push_str("Ref");
            output.push(BASES[r]);
            for &count in row {
                let pc = if count > 0 {
                    100.0 * count as f64 / self.matrix_substitutions as f64
                } else {
                    0.0
                };
                let _ = write!(output, "\t{:.2}", pc);
            }
            output.push('\n');
        }
        output
    }

    pub fn insertion_size_text(&self) -> String {
        size_distribution_text(&self.insertion_sizes, self.insertion_count)
    }

    pub fn deletion_size_text(&self) -> String {
        size_distribution_text(&self.deletion_sizes, self.deletion_count)
    }
}

fn mean(sum: u64, n: u64) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}

/// `size\tpercent` for sizes `1..=largest`.
fn size_distribution_text(sizes: &Histogram, n: u64) -> String {
    let mut output = String::new();
    let largest = sizes.max_index().unwrap_or(0);
    for size in 1..=largest {
        let pc = if n > 0 {
            100.0 * sizes.get(size) as f64 / n as f64
        } else {
            0.0
        };
        let _ = writeln!(output, "{}\t{:.4}", size, pc);
    }
    output
}
