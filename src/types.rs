//src/types.rs

use crate::stats::PerfectKmerTally;

/// Gap character used in aligned strings by every supported aligner.
pub const GAP: u8 = b'-';

/// Orientation of the query relative to the hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    /// Parse a MAF/LAST strand field (`+` or `-`).
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// One raw local alignment block, normalised from whatever aligner produced it.
///
/// `query_aligned` and `hit_aligned` are column-paired strings; a `-` may appear
/// in either of them but never in both at the same column.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentFragment {
    pub query_id: String,
    pub query_seq_len: usize,
    /// 0-based
    pub query_start: usize,
    pub query_aligned: String,
    pub hit_id: String,
    pub hit_seq_len: usize,
    /// 0-based
    pub hit_start: usize,
    pub hit_aligned: String,
    pub strand: Strand,
    pub score: i64,
}

impl AlignmentFragment {
    /// Number of columns that can be paired between the two sides.
    pub fn paired_len(&self) -> usize {
        self.query_aligned.len().min(self.hit_aligned.len())
    }

    /// Query bases consumed by this block (gaps excluded).
    pub fn query_aligned_size(&self) -> usize {
        self.query_aligned.bytes().filter(|&b| b != GAP).count()
    }

    /// Hit bases consumed by this block (gaps excluded).
    pub fn hit_aligned_size(&self) -> usize {
        self.hit_aligned.bytes().filter(|&b| b != GAP).count()
    }

    /// First column where both sides carry a gap, if any.
    pub fn first_double_gap(&self) -> Option<usize> {
        self.query_aligned
            .bytes()
            .zip(self.hit_aligned.bytes())
            .position(|(q, h)| q == GAP && h == GAP)
    }
}

/// Class of a single alignment error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Insertion,
    Deletion,
    Substitution,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::Insertion,
        EventKind::Deletion,
        EventKind::Substitution,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Insertion => "insertion",
            EventKind::Deletion => "deletion",
            EventKind::Substitution => "substitution",
        }
    }
}

/// An error found while classifying merged alignment columns.
///
/// `context` is the perfect-match run immediately preceding the event (may be empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorEvent {
    Insertion { size: usize, context: String },
    Deletion { size: usize, context: String },
    Substitution { context: String, ref_base: u8, read_base: u8 },
}

impl ErrorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ErrorEvent::Insertion { .. } => EventKind::Insertion,
            ErrorEvent::Deletion { .. } => EventKind::Deletion,
            ErrorEvent::Substitution { .. } => EventKind::Substitution,
        }
    }

    /// Indel length, 1 for a substitution.
    pub fn size(&self) -> usize {
        match self {
            ErrorEvent::Insertion { size, .. } | ErrorEvent::Deletion { size, .. } => *size,
            ErrorEvent::Substitution { .. } => 1,
        }
    }

    pub fn context(&self) -> &str {
        match self {
            ErrorEvent::Insertion { context, .. }
            | ErrorEvent::Deletion { context, .. }
            | ErrorEvent::Substitution { context, .. } => context,
        }
    }
}

/// Result of merging every fragment of a read's canonical hit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedAlignmentSummary {
    pub hit_id: String,
    pub hit_size: usize,
    pub query_id: String,
    pub query_size: usize,
    pub query_strand: Strand,
    pub identical_bases: usize,
    pub kmers: PerfectKmerTally,
    pub alignment_size: usize,
    pub alignment_size_without_indels: usize,
    pub overall_query_start: Option<usize>,
    pub overall_query_end: Option<usize>,
    pub overall_hit_start: Option<usize>,
    pub overall_hit_end: Option<usize>,
}

impl MergedAlignmentSummary {
    pub fn longest_perfect_kmer(&self) -> usize {
        self.kmers.longest
    }

    /// Mean perfect k-mer length, 0 when no perfect run was seen.
    pub fn mean_perfect_kmer(&self) -> f64 {
        self.kmers.mean()
    }

    pub fn query_identity(&self) -> f64 {
        percent(self.identical_bases, self.query_size)
    }

    pub fn alignment_identity(&self) -> f64 {
        percent(self.identical_bases, self.alignment_size)
    }

    pub fn alignment_identity_without_indels(&self) -> f64 {
        percent(self.identical_bases, self.alignment_size_without_indels)
    }

    pub fn percent_query_aligned(&self) -> f64 {
        percent(self.alignment_size, self.query_size)
    }

    pub fn overall_query_span(&self) -> usize {
        span(self.overall_query_start, self.overall_query_end)
    }

    pub fn overall_hit_span(&self) -> usize {
        span(self.overall_hit_start, self.overall_hit_end)
    }
}

fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        100.0 * numerator as f64 / denominator as f64
    }
}

fn span(start: Option<usize>, end: Option<usize>) -> usize {
    match (start, end) {
        (Some(s), Some(e)) => e.saturating_sub(s),
        _ => 0,
    }
}

/// A structured representation of one alignments-table line.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentTableRow {
    Merged {
        filename: String,
        summary: MergedAlignmentSummary,
    },
    NoAlignments {
        filename: String,
    },
}

impl AlignmentTableRow {
    pub fn filename(&self) -> &str {
        match self {
            AlignmentTableRow::Merged { filename, .. }
            | AlignmentTableRow::NoAlignments { filename } => filename,
        }
    }
}
