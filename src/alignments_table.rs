//src/alignments_table.rs

use std::fmt::Write as _;

use crate::types::{AlignmentTableRow, MergedAlignmentSummary};

pub const ALIGNMENTS_TABLE_HEADER: &str = "Filename\tQueryName\tQueryStart\tQueryBasesCovered\tQueryStrand\tQueryLength\tHitName\tHitStart\tHitBasesCovered\tHitStrand\tHitLength\tAlignmentSize\tIdenticalBases\tAlignmentPercentIdentity\tQueryPercentIdentity\tLongestPerfectKmer\tMeanPerfectKmer\tPercentQueryAligned\tnk15\tnk17\tnk19\tnk21\tnk23\tnk25";

/// Per-read rows, kept in the order the files were given.
#[derive(Debug, Clone, Default)]
pub struct AlignmentsTable {
    rows: Vec<AlignmentTableRow>,
}

impl AlignmentsTable {
    pub fn new(rows: Vec<AlignmentTableRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AlignmentTableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get_text(&self) -> String {
        let mut output = String::with_capacity(ALIGNMENTS_TABLE_HEADER.len() + 1 + self.rows.len() * 128);
        output.push_str(ALIGNMENTS_TABLE_HEADER);
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format_row(row));
            output.push('\n');
        }
        output
    }
}

pub fn format_row(row: &AlignmentTableRow) -> String {
    match row {
        AlignmentTableRow::NoAlignments { filename } => format!("{}\tNO ALIGNMENTS", filename),
        AlignmentTableRow::Merged { filename, summary } => format_merged(filename, summary),
    }
}

fn format_merged(filename: &str, s: &MergedAlignmentSummary) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t+\t{}\t{}\t{}\t{:.2}\t{:.2}\t{}\t{:.2}\t{:.2}\t{}",
        filename,
        s.query_id,
        s.overall_query_start.unwrap_or(0),
        s.overall_query_span(),
        s.query_strand.as_char(),
        s.query_size,
        s.hit_id,
        s.overall_hit_start.unwrap_or(0),
        s.overall_hit_span(),
        s.hit_size,
        s.alignment_size,
        s.identical_bases,
        s.alignment_identity(),
        s.query_identity(),
        s.longest_perfect_kmer(),
        s.mean_perfect_kmer(),
        s.percent_query_aligned(),
        s.kmers.k_counts_text()
    );
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strand;

    #[test]
    fn test_header_columns() {
        assert_eq!(ALIGNMENTS_TABLE_HEADER.split('\t').count(), 24);
    }

    #[test]
    fn test_no_alignments_row() {
        let row = AlignmentTableRow::NoAlignments {
            filename: "read_9.maf".into(),
        };
        assert_eq!(format_row(&row), "read_9.maf\tNO ALIGNMENTS");
    }

    #[test]
    fn test_merged_row() {
        let mut summary = MergedAlignmentSummary {
            hit_id: "chr1".into(),
            hit_size: 5000,
            query_id: "read1".into(),
            query_size: 200,
            query_strand: Strand::Reverse,
            identical_bases: 90,
            alignment_size: 100,
            alignment_size_without_indels: 95,
            overall_query_start: Some(10),
            overall_query_end: Some(108),
            overall_hit_start: Some(1000),
            overall_hit_end: Some(1097),
            ..Default::default()
        };
        summary.kmers.observe(20);
        summary.kmers.observe(10);

        let table = AlignmentsTable::new(vec![AlignmentTableRow::Merged {
            filename: "read1.maf".into(),
            summary,
        }]);
        let text = table.get_text();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "read1.maf\tread1\t10\t98\t-\t200\tchr1\t1000\t97\t+\t5000\t100\t90\t90.00\t45.00\t20\t15.00\t50.00\t1\t1\t1\t0\t0\t0"
        );
        assert_eq!(line.split('\t').count(), 24);
    }
}
