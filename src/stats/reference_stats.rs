// src/stats/reference_stats.rs

use std::fmt::Write as _;

use super::error_profile::ErrorProfile;
use super::Histogram;
use crate::error::{ProfileError, Result};
use crate::merge::ReadProfile;
use crate::types::Strand;

/// Coverage bin width that gives roughly 100 bins, rounded to a multiple of
/// 10, 100 or 500 depending on the reference size.
pub fn default_coverage_bin_size(size: usize) -> usize {
    let b = (size / 100) as f64;
    let (step, scale) = if size < 50_000 {
        (10, 10.0)
    } else if size < 500_000 {
        (100, 100.0)
    } else {
        (500, 500.0)
    };
    step * (1 + (b / scale).round() as usize)
}

/// Everything accumulated against one reference for one read type.
#[derive(Debug, Clone)]
pub struct ReferenceSequenceStats {
    name: String,
    size: usize,
    coverage: Vec<u64>,
    perfect_kmers: Histogram,
    best_perfect_kmers: Histogram,
    cumulative_best_perfect_kmers: Histogram,
    longest_perfect_kmer: usize,
    errors: ErrorProfile,
    reads_with_alignments: u64,
    total_aligned_bases: u64,
    total_aligned_bases_without_indels: u64,
    total_identical_bases: u64,
    total_read_bases: u64,
    forward_reads: u64,
    reverse_reads: u64,
}

impl ReferenceSequenceStats {
    pub fn new(name: &str, size: usize) -> Self {
        Self {
            name: name.to_string(),
            size,
            coverage: vec![0; size],
            perfect_kmers: Histogram::default(),
            best_perfect_kmers: Histogram::default(),
            cumulative_best_perfect_kmers: Histogram::default(),
            longest_perfect_kmer: 0,
            errors: ErrorProfile::default(),
            reads_with_alignments: 0,
            total_aligned_bases: 0,
            total_aligned_bases_without_indels: 0,
            total_identical_bases: 0,
            total_read_bases: 0,
            forward_reads: 0,
            reverse_reads: 0,
        }
    }

    /// Fold one merged read into the totals.
    ///
    /// Coverage ranges are checked before anything is touched, so a read that
    /// doesn't fit the reference leaves the stats unchanged.
    pub fn record_read(&mut self, read: &ReadProfile) -> Result<()> {
        for range in &read.hit_ranges {
            if range.end > self.size {
                return Err(ProfileError::out_of_range("reference", range.end, self.size + 1));
            }
        }

        for range in &read.hit_ranges {
            for depth in &mut self.coverage[range.clone()] {
                *depth += 1;
            }
        }

        for &run in &read.perfect_runs {
            self.perfect_kmers.add(run);
        }
        let best = read.summary.longest_perfect_kmer();
        self.longest_perfect_kmer = self.longest_perfect_kmer.max(best);
        self.best_perfect_kmers.add(best);
        self.cumulative_best_perfect_kmers.add_cumulative(best);

        for event in &read.events {
            self.errors.observe(event);
        }

        let s = &read.summary;
        self.reads_with_alignments += 1;
        self.total_aligned_bases += s.alignment_size as u64;
        self.total_aligned_bases_without_indels += s.alignment_size_without_indels as u64;
        self.total_identical_bases += s.identical_bases as u64;
        self.total_read_bases += s.query_size as u64;
        match s.query_strand {
            Strand::Forward => self.forward_reads += 1,
            Strand::Reverse => self.reverse_reads += 1,
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn coverage(&self) -> &[u64] {
        &self.coverage
    }

    pub fn errors(&self) -> &ErrorProfile {
        &self.errors
    }

    pub fn reads_with_alignments(&self) -> u64 {
        self.reads_with_alignments
    }

    pub fn longest_perfect_kmer(&self) -> usize {
        self.longest_perfect_kmer
    }

    pub fn perfect_kmers(&self) -> &Histogram {
        &self.perfect_kmers
    }

    pub fn best_perfect_kmers(&self) -> &Histogram {
        &self.best_perfect_kmers
    }

    pub fn cumulative_best_perfect_kmers(&self) -> &Histogram {
        &self.cumulative_best_perfect_kmers
    }

    pub fn total_aligned_bases(&self) -> u64 {
        self.total_aligned_bases
    }

    pub fn total_identical_bases(&self) -> u64 {
        self.total_identical_bases
    }

    pub fn strand_counts(&self) -> (u64, u64) {
        (self.forward_reads, self.reverse_reads)
    }

    pub fn aligned_percent_identical(&self) -> f64 {
        percent(self.total_identical_bases, self.total_aligned_bases)
    }

    pub fn aligned_percent_identical_without_indels(&self) -> f64 {
        percent(self.total_identical_bases, self.total_aligned_bases_without_indels)
    }

    pub fn read_percent_identical(&self) -> f64 {
        percent(self.total_identical_bases, self.total_read_bases)
    }

    pub fn percent_insertion_errors(&self) -> f64 {
        percent(self.errors.inserted_bases, self.total_aligned_bases)
    }

    pub fn percent_deletion_errors(&self) -> f64 {
        percent(self.errors.deleted_bases, self.total_aligned_bases)
    }

    pub fn percent_substitution_errors(&self) -> f64 {
        percent(self.errors.substitution_count, self.total_aligned_bases)
    }

    pub fn percent_forward(&self) -> f64 {
        percent(self.forward_reads, self.reads_with_alignments)
    }

    pub fn percent_reverse(&self) -> f64 {
        percent(self.reverse_reads, self.reads_with_alignments)
    }

    /// `len\tcount` for every perfect run length up to the longest seen.
    pub fn perfect_kmers_text(&self) -> String {
        let mut output = String::new();
        for len in 1..=self.longest_perfect_kmer {
            let _ = writeln!(output, "{}\t{}", len, self.perfect_kmers.get(len));
        }
        output
    }

    /// `len\treads\tpercent` of reads whose best perfect run is `len`.
    pub fn best_perfect_kmers_text(&self) -> String {
        self.read_histogram_text(&self.best_perfect_kmers)
    }

    /// `len\treads\tpercent` of reads with a perfect run of at least `len`.
    pub fn cumulative_perfect_kmers_text(&self) -> String {
        self.read_histogram_text(&self.cumulative_best_perfect_kmers)
    }

    fn read_histogram_text(&self, hist: &Histogram) -> String {
        let mut output = String::new();
        for len in 1..=self.longest_perfect_kmer {
            let count = hist.get(len);
            let _ = writeln!(
                output,
                "{}\t{}\t{:.2}",
                len,
                count,
                percent(count, self.reads_with_alignments)
            );
        }
        output
    }

    /// Mean depth per bin, `start\tdepth`. The trailing partial bin is dropped.
    pub fn coverage_text(&self, bin_size: Option<usize>) -> String {
        let bin = bin_size
            .filter(|&b| b > 0)
            .unwrap_or_else(|| default_coverage_bin_size(self.size));
        let mut output = String::new();
        let mut start = 0;
        while start + bin <= self.size {
            let sum: u64 = self.coverage[start..start + bin].iter().sum();
            let _ = writeln!(output, "{}\t{:.2}", start, sum as f64 / bin as f64);
            start += bin;
        }
        output
    }

    /// One row of the reference summary table.
    pub fn summary_line(&self, id_width: usize) -> String {
        format!(
            "{:<width$} {:<12} {:<10} {:<10}",
            self.name,
            self.size,
            self.reads_with_alignments,
            self.longest_perfect_kmer,
            width = id_width
        )
    }

    /// Error-rate block for reports.
    pub fn error_summary_text(&self) -> String {
        let e = &self.errors;
        let mut output = String::new();
        let _ = writeln!(output, "Reference: {}", self.name);
        let _ = writeln!(output, "Reads with alignments: {}", self.reads_with_alignments);
        let _ = writeln!(
            output,
            "Strand: {:.2}% forward, {:.2}% reverse",
            self.percent_forward(),
            self.percent_reverse()
        );
        let _ = writeln!(output, "Aligned bases identity: {:.2}%", self.aligned_percent_identical());
        let _ = writeln!(
            output,
            "Aligned bases identity without indels: {:.2}%",
            self.aligned_percent_identical_without_indels()
        );
        let _ = writeln!(output, "Read bases identity: {:.2}%", self.read_percent_identical());
        let _ = writeln!(
            output,
            "Insertions: {} ({:.2}% of aligned bases, mean size {:.2})",
            e.insertion_count,
            self.percent_insertion_errors(),
            e.mean_insertion_size()
        );
        let _ = writeln!(
            output,
            "Deletions: {} ({:.2}% of aligned bases, mean size {:.2})",
            e.deletion_count,
            self.percent_deletion_errors(),
            e.mean_deletion_size()
        );
        let _ = writeln!(
            output,
            "Substitutions: {} ({:.2}% of aligned bases)",
            e.substitution_count,
            self.percent_substitution_errors()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorEvent, MergedAlignmentSummary};

    fn read(best: usize, hit_ranges: Vec<std::ops::Range<usize>>, strand: Strand) -> ReadProfile {
        let mut summary = MergedAlignmentSummary {
            query_size: 100,
            alignment_size: 50,
            alignment_size_without_indels: 48,
            identical_bases: 45,
            query_strand: strand,
            ..Default::default()
        };
        summary.kmers.observe(best);
        ReadProfile {
            summary,
            events: vec![
                ErrorEvent::Insertion { size: 2, context: "ACGTA".into() },
                ErrorEvent::Substitution { context: "CCC".into(), ref_base: b'A', read_base: b'G' },
            ],
            perfect_runs: vec![best],
            hit_ranges,
            covered_bases: 50,
        }
    }

    #[test]
    fn test_default_bin_sizes() {
        assert_eq!(default_coverage_bin_size(1_000), 20);
        assert_eq!(default_coverage_bin_size(5_000), 60);
        assert_eq!(default_coverage_bin_size(48_502), 500);
        assert_eq!(default_coverage_bin_size(100_000), 1_100);
        assert_eq!(default_coverage_bin_size(4_600_000), 46_500);
    }

    #[test]
    fn test_record_read_accumulates() {
        let mut stats = ReferenceSequenceStats::new("chr1", 200);
        stats.record_read(&read(20, vec![10..60], Strand::Forward)).unwrap();
        stats.record_read(&read(5, vec![50..70], Strand::Reverse)).unwrap();

        assert_eq!(stats.reads_with_alignments(), 2);
        assert_eq!(stats.coverage()[9], 0);
        assert_eq!(stats.coverage()[10], 1);
        assert_eq!(stats.coverage()[55], 2);
        assert_eq!(stats.coverage()[69], 1);
        assert_eq!(stats.coverage()[70], 0);
        assert_eq!(stats.longest_perfect_kmer(), 20);
        assert_eq!(stats.best_perfect_kmers().get(20), 1);
        assert_eq!(stats.cumulative_best_perfect_kmers().get(5), 2);
        assert_eq!(stats.cumulative_best_perfect_kmers().get(6), 1);
        assert_eq!(stats.errors().insertion_count, 2);
        assert_eq!(stats.errors().substitution(b'A', b'G'), 2);
        assert_eq!(stats.strand_counts(), (1, 1));
        assert!((stats.percent_forward() - 50.0).abs() < 1e-9);
        assert!((stats.aligned_percent_identical() - 90.0).abs() < 1e-9);
        assert!((stats.read_percent_identical() - 45.0).abs() < 1e-9);
        assert!((stats.percent_insertion_errors() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_range_past_end_leaves_stats_untouched() {
        let mut stats = ReferenceSequenceStats::new("chr1", 100);
        let err = stats.record_read(&read(10, vec![0..10, 95..101], Strand::Forward));
        assert!(matches!(err, Err(ProfileError::PositionOutOfRange { .. })));
        assert_eq!(stats.reads_with_alignments(), 0);
        assert_eq!(stats.coverage()[0], 0);
    }

    #[test]
    fn test_histogram_texts() {
        let mut stats = ReferenceSequenceStats::new("chr1", 100);
        stats.record_read(&read(3, vec![0..10], Strand::Forward)).unwrap();
        stats.record_read(&read(2, vec![0..10], Strand::Forward)).unwrap();
        assert_eq!(stats.perfect_kmers_text(), "1\t0\n2\t1\n3\t1\n");
        assert_eq!(
            stats.best_perfect_kmers_text(),
            "1\t0\t0.00\n2\t1\t50.00\n3\t1\t50.00\n"
        );
        assert_eq!(
            stats.cumulative_perfect_kmers_text(),
            "1\t2\t100.00\n2\t2\t100.00\n3\t1\t50.00\n"
        );
    }

    #[test]
    fn test_coverage_bins() {
        let mut stats = ReferenceSequenceStats::new("chr1", 35);
        stats.record_read(&read(3, vec![0..10, 10..15], Strand::Forward)).unwrap();
        let text = stats.coverage_text(Some(10));
        assert_eq!(text, "0\t1.00\n10\t0.50\n20\t0.00\n");
    }

    #[test]
    fn test_full_last_coverage_bin_kept() {
        let mut stats = ReferenceSequenceStats::new("chr1", 30);
        stats.record_read(&read(3, vec![20..30], Strand::Forward)).unwrap();
        assert_eq!(stats.coverage_text(Some(10)), "0\t0.00\n10\t0.00\n20\t1.00\n");
    }

    #[test]
    fn test_summary_line() {
        let stats = ReferenceSequenceStats::new("chr1", 5000);
        assert_eq!(stats.summary_line(6), "chr1   5000         0          0         ");
    }
}
