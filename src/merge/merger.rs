// src/merge/merger.rs

use std::mem;
use std::ops::Range;

use super::coverage::CoverageBitmap;
use crate::error::{ProfileError, Result};
use crate::types::{AlignmentFragment, ErrorEvent, MergedAlignmentSummary, GAP};

/// Everything one read contributes to the statistics.
#[derive(Debug, Clone, Default)]
pub struct ReadProfile {
    pub summary: MergedAlignmentSummary,
    /// Error events in column order
    pub events: Vec<ErrorEvent>,
    /// Length of every perfect run, in column order
    pub perfect_runs: Vec<usize>,
    /// Hit range consumed by each fragment that contributed columns
    pub hit_ranges: Vec<Range<usize>>,
    /// Query positions claimed by the merge
    pub covered_bases: usize,
}

/// Column state that lives for one fragment only.
#[derive(Default)]
struct ColumnState {
    perfect: String,
    insertion: usize,
    deletion: usize,
    error_kmer: String,
}

/// Merges the fragments of one read's canonical hit into a single
/// non-redundant alignment, classifying every column it keeps.
///
/// Fragments must be added highest priority first; any query base already
/// claimed by an earlier fragment is never counted again.
pub struct AlignmentMerger {
    coverage: CoverageBitmap,
    summary: MergedAlignmentSummary,
    events: Vec<ErrorEvent>,
    perfect_runs: Vec<usize>,
    hit_ranges: Vec<Range<usize>>,
    fragments_seen: usize,
}

impl AlignmentMerger {
    pub fn new(read_length: usize) -> Self {
        Self {
            coverage: CoverageBitmap::new(read_length),
            summary: MergedAlignmentSummary {
                query_size: read_length,
                ..Default::default()
            },
            events: Vec::new(),
            perfect_runs: Vec::new(),
            hit_ranges: Vec::new(),
            fragments_seen: 0,
        }
    }

    pub fn add_fragment(&mut self, fragment: &AlignmentFragment) -> Result<()> {
        self.check_identity(fragment)?;

        let query = fragment.query_aligned.as_bytes();
        let hit = fragment.hit_aligned.as_bytes();
        if query.len() != hit.len() {
            log::warn!(
                "Aligned lengths differ for {} vs {} ({} vs {}), truncating to {}",
                fragment.query_id,
                fragment.hit_id,
                query.len(),
                hit.len(),
                fragment.paired_len()
            );
        }
        let columns = fragment.paired_len();

        let mut query_pos = fragment.query_start;
        let mut hit_pos = fragment.hit_start;
        let mut i = 0;

        // Skip the part already owned by a higher-priority fragment
        while i < columns && self.coverage.is_covered(query_pos) {
            if query[i] != GAP {
                query_pos += 1;
            }
            if hit[i] != GAP {
                hit_pos += 1;
            }
            i += 1;
        }

        let query_from = query_pos;
        let hit_from = hit_pos;
        let mut consumed = 0usize;
        let mut state = ColumnState::default();

        while i < columns {
            if self.coverage.is_covered(query_pos) {
                break;
            }
            let (q, h) = (query[i], hit[i]);

            if q == GAP && h == GAP {
                log::warn!("Gap on both sides at column {} of {}", i, fragment.query_id);
                i += 1;
                continue;
            }

            if q.eq_ignore_ascii_case(&h) {
                self.close_indel(&mut state);
                state.perfect.push(q.to_ascii_uppercase() as char);
                self.coverage.mark(query_pos)?;
                self.summary.identical_bases += 1;
                self.summary.alignment_size_without_indels += 1;
                query_pos += 1;
                hit_pos += 1;
            } else {
                let context = mem::take(&mut state.perfect);
                self.observe_perfect_run(context.len());

                if h == GAP {
                    if state.insertion == 0 {
                        self.close_indel(&mut state);
                        state.error_kmer = context;
                    }
                    state.insertion += 1;
                    self.coverage.mark(query_pos)?;
                    query_pos += 1;
                } else if q == GAP {
                    if state.deletion == 0 {
                        self.close_indel(&mut state);
                        state.error_kmer = context;
                    }
                    state.deletion += 1;
                    hit_pos += 1;
                } else {
                    self.close_indel(&mut state);
                    self.events.push(ErrorEvent::Substitution {
                        context,
                        ref_base: h.to_ascii_uppercase(),
                        read_base: q.to_ascii_uppercase(),
                    });
                    self.coverage.mark(query_pos)?;
                    self.summary.alignment_size_without_indels += 1;
                    query_pos += 1;
                    hit_pos += 1;
                }
            }

            self.summary.alignment_size += 1;
            consumed += 1;
            i += 1;
        }

        let run = state.perfect.len();
        self.observe_perfect_run(run);
        self.close_indel(&mut state);

        if consumed > 0 {
            self.extend_overall(query_from..query_pos, hit_from..hit_pos);
            if hit_pos > hit_from {
                self.hit_ranges.push(hit_from..hit_pos);
            }
        }

        log::debug!(
            "Fragment {}:{} vs {}:{} contributed {} of {} columns",
            fragment.query_id,
            fragment.query_start,
            fragment.hit_id,
            fragment.hit_start,
            consumed,
            columns
        );
        Ok(())
    }

    /// Finish the merge and hand back the read's profile.
    pub fn finish(self) -> ReadProfile {
        ReadProfile {
            covered_bases: self.coverage.count_covered(),
            summary: self.summary,
            events: self.events,
            perfect_runs: self.perfect_runs,
            hit_ranges: self.hit_ranges,
        }
    }

    fn check_identity(&mut self, fragment: &AlignmentFragment) -> Result<()> {
        if self.fragments_seen == 0 {
            self.summary.query_id = fragment.query_id.clone();
            self.summary.hit_id = fragment.hit_id.clone();
            self.summary.hit_size = fragment.hit_seq_len;
            self.summary.query_strand = fragment.strand;
        } else if self.summary.query_id != fragment.query_id {
            return Err(ProfileError::QueryMismatch {
                expected: self.summary.query_id.clone(),
                found: fragment.query_id.clone(),
            });
        } else if self.summary.hit_id != fragment.hit_id {
            return Err(ProfileError::HitMismatch {
                expected: self.summary.hit_id.clone(),
                found: fragment.hit_id.clone(),
            });
        }
        self.fragments_seen += 1;
        Ok(())
    }

    fn observe_perfect_run(&mut self, length: usize) {
        if length > 0 {
            self.summary.kmers.observe(length);
            self.perfect_runs.push(length);
        }
    }

    /// Emit whichever indel run is pending, with its snapshot context.
    fn close_indel(&mut self, state: &mut ColumnState) {
        if state.deletion > 0 {
            self.events.push(ErrorEvent::Deletion {
                size: state.deletion,
                context: state.error_kmer.clone(),
            });
            state.deletion = 0;
        }
        if state.insertion > 0 {
            self.events.push(ErrorEvent::Insertion {
                size: state.insertion,
                context: state.error_kmer.clone(),
            });
            state.insertion = 0;
        }
        state.error_kmer.clear();
    }

    fn extend_overall(&mut self, query: Range<usize>, hit: Range<usize>) {
        let s = &mut self.summary;
        s.overall_query_start = Some(s.overall_query_start.map_or(query.start, |v| v.min(query.start)));
        s.overall_query_end = Some(s.overall_query_end.map_or(query.end, |v| v.max(query.end)));
        s.overall_hit_start = Some(s.overall_hit_start.map_or(hit.start, |v| v.min(hit.start)));
        s.overall_hit_end = Some(s.overall_hit_end.map_or(hit.end, |v| v.max(hit.end)));
    }
}

/// Merge an ordered fragment list in one go.
pub fn merge_fragments(fragments: &[AlignmentFragment], read_length: usize) -> Result<ReadProfile> {
    let mut merger = AlignmentMerger::new(read_length);
    for fragment in fragments {
        merger.add_fragment(fragment)?;
    }
    Ok(merger.finish())
}
