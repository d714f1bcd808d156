// src/merge/selector.rs

use rand::Rng;

use crate::types::AlignmentFragment;

/// Fragments chosen for merging, all against the canonical hit.
#[derive(Debug, Clone)]
pub struct FragmentSelection {
    pub canonical_hit: String,
    /// Read length reported by the fragment that picked the canonical hit
    pub read_length: usize,
    /// Descending score order (stable for equal scores)
    pub fragments: Vec<AlignmentFragment>,
}

/// Pick the canonical hit of a read and the fragments that align to it.
///
/// Ties for the top score are broken with `rng` when given, otherwise the first
/// fragment in score order wins. Returns `None` when there are no fragments.
pub fn select_fragments<R: Rng>(
    mut fragments: Vec<AlignmentFragment>,
    rng: Option<&mut R>,
) -> Option<FragmentSelection> {
    if fragments.is_empty() {
        return None;
    }

    // stable sort keeps input order among equal scores
    fragments.sort_by(|a, b| b.score.cmp(&a.score));

    let top_score = fragments[0].score;
    let tied = fragments
        .iter()
        .take_while(|f| f.score == top_score)
        .count();

    let index = match rng {
        Some(rng) if tied > 1 => rng.random_range(0..tied),
        _ => 0,
    };

    let canonical_hit = fragments[index].hit_id.clone();
    let read_length = fragments[index].query_seq_len;
    log::debug!(
        "Picked fragment {} of {} tied at score {} => hit {}",
        index,
        tied,
        top_score,
        canonical_hit
    );

    fragments.retain(|f| f.hit_id == canonical_hit);

    Some(FragmentSelection {
        canonical_hit,
        read_length,
        fragments,
    })
}
