// src/stats/mod.rs

pub mod error_profile;
pub mod motifs;
pub mod read_set_stats;
pub mod reference_stats;

pub use error_profile::{base_index, ErrorProfile, PerfectKmerTally, KMER_THRESHOLDS};
pub use motifs::{KmerMotifStatistic, LogoSelection, MotifStatistics, MOTIF_SIZES};
pub use read_set_stats::ReadSetStats;
pub use reference_stats::ReferenceSequenceStats;

/// A count histogram indexed from 0 that grows on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u64>,
}

impl Histogram {
    pub fn add(&mut self, index: usize) {
        if index >= self.counts.len() {
            self.counts.resize(index + 1, 0);
        }
        self.counts[index] += 1;
    }

    /// Increment every bin in `1..=upto`.
    pub fn add_cumulative(&mut self, upto: usize) {
        if upto >= self.counts.len() {
            self.counts.resize(upto + 1, 0);
        }
        for count in &mut self.counts[1..=upto] {
            *count += 1;
        }
    }

    pub fn get(&self, index: usize) -> u64 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Largest index with a non-zero count.
    pub fn max_index(&self) -> Option<usize> {
        self.counts.iter().rposition(|&c| c > 0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn merge(&mut self, other: &Histogram) {
        if other.counts.len() > self.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (count, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *count += theirs;
        }
    }
}
