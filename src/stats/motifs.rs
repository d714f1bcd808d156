// src/stats/motifs.rs

use std::fmt::Write as _;

use ahash::AHashMap;

use crate::types::EventKind;

/// Motif lengths tracked for every error kind.
pub const MOTIF_SIZES: [usize; 3] = [3, 4, 5];

/// Which end of the count-sorted motif list feeds a base-count matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoSelection {
    Top(usize),
    Bottom(usize),
}

/// Occurrence counts of the `k`-mers that precede one kind of error.
#[derive(Debug, Clone)]
pub struct KmerMotifStatistic {
    k: usize,
    motifs: AHashMap<String, u64>,
    total: u64,
}

impl KmerMotifStatistic {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            motifs: AHashMap::new(),
            total: 0,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn add(&mut self, motif: &str) {
        *self.motifs.entry(motif.to_string()).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn merge(&mut self, other: &KmerMotifStatistic) {
        for (motif, &count) in &other.motifs {
            *self.motifs.entry(motif.clone()).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn count(&self, motif: &str) -> u64 {
        self.motifs.get(motif).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Motifs by descending count; equal counts ordered by motif.
    pub fn sorted_counts(&self) -> Vec<(&str, u64)> {
        let mut list: Vec<(&str, u64)> = self
            .motifs
            .iter()
            .map(|(m, &c)| (m.as_str(), c))
            .collect();
        list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        list
    }

    /// Same order as `sorted_counts`, as a percentage of all motifs seen.
    pub fn sorted_percentages(&self) -> Vec<(&str, f64)> {
        self.sorted_counts()
            .into_iter()
            .map(|(m, c)| (m, 100.0 * c as f64 / self.total as f64))
            .collect()
    }

    /// 4 x k matrix (rows A, C, G, T) of count-weighted bases at each motif position,
    /// built from the top or bottom `n` motifs (fewer if not that many were seen).
    pub fn base_counts(&self, selection: LogoSelection) -> [Vec<u64>; 4] {
        let mut counts = [
            vec![0; self.k],
            vec![0; self.k],
            vec![0; self.k],
            vec![0; self.k],
        ];
        let list = self.sorted_counts();
        let chosen: Vec<&(&str, u64)> = match selection {
            LogoSelection::Top(n) => list.iter().take(n).collect(),
            LogoSelection::Bottom(n) => list.iter().rev().take(n).collect(),
        };

        for (motif, count) in chosen {
            for (pos, b) in motif.bytes().enumerate().take(self.k) {
                if let Some(row) = super::base_index(b) {
                    counts[row][pos] += count;
                }
            }
        }
        counts
    }

    /// `Kmer\tPercentage` table.
    pub fn percent_text(&self) -> String {
        let mut output = String::from("Kmer\tPercentage\n");
        for (motif, pc) in self.sorted_percentages() {
            let _ = writeln!(output, "{}\t{:.4}", motif, pc);
        }
        output
    }
}

/// Motif tables for every `(error kind, k)` pair.
#[derive(Debug, Clone)]
pub struct MotifStatistics {
    tables: [[KmerMotifStatistic; 3]; 3],
}

impl Default for MotifStatistics {
    fn default() -> Self {
        Self {
            tables: [0, 1, 2].map(|_| MOTIF_SIZES.map(KmerMotifStatistic::new)),
        }
    }
}

impl MotifStatistics {
    /// Record the last `k` characters of `context` for each `k` it is longer than.
    pub fn add(&mut self, kind: EventKind, context: &str) {
        let n = context.chars().count();
        for table in self.tables[kind_index(kind)].iter_mut() {
            let k = table.k();
            if n > k {
                let motif: String = context.chars().skip(n - k).collect();
                table.add(&motif);
            }
        }
    }

    pub fn merge(&mut self, other: &MotifStatistics) {
        for (mine, theirs) in self.tables.iter_mut().zip(&other.tables) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                a.merge(b);
            }
        }
    }

    /// Table for one kind and `k`, `None` unless `k` is in `MOTIF_SIZES`.
    pub fn get(&self, kind: EventKind, k: usize) -> Option<&KmerMotifStatistic> {
        let i = MOTIF_SIZES.iter().position(|&s| s == k)?;
        self.tables[kind_index(kind)].get(i)
    }

    pub fn total(&self, kind: EventKind, k: usize) -> u64 {
        self.get(kind, k).map_or(0, |table| table.total())
    }
}

fn kind_index(kind: EventKind) -> usize {
    match kind {
        EventKind::Insertion => 0,
        EventKind::Deletion => 1,
        EventKind::Substitution => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motif_suffixes() {
        let mut stats = MotifStatistics::default();
        stats.add(EventKind::Insertion, "GGACGTA");
        assert_eq!(stats.get(EventKind::Insertion, 3).unwrap().count("GTA"), 1);
        assert_eq!(stats.get(EventKind::Insertion, 4).unwrap().count("CGTA"), 1);
        assert_eq!(stats.get(EventKind::Insertion, 5).unwrap().count("ACGTA"), 1);
        assert_eq!(stats.total(EventKind::Deletion, 3), 0);
        assert!(stats.get(EventKind::Insertion, 7).is_none());
        assert_eq!(stats.total(EventKind::Insertion, 7), 0);
    }

    #[test]
    fn test_short_context_skipped() {
        let mut stats = MotifStatistics::default();
        stats.add(EventKind::Deletion, "ACG");
        stats.add(EventKind::Deletion, "");
        for k in MOTIF_SIZES {
            assert_eq!(stats.total(EventKind::Deletion, k), 0);
        }
    }

    #[test]
    fn test_sorted_and_percent_views() {
        let mut table = KmerMotifStatistic::new(3);
        for m in ["AAA", "CCC", "AAA", "GGG", "AAA", "CCC"] {
            table.add(m);
        }
        let sorted = table.sorted_counts();
        assert_eq!(sorted[0], ("AAA", 3));
        assert_eq!(sorted[1], ("CCC", 2));
        assert_eq!(sorted[2], ("GGG", 1));
        let pcs = table.sorted_percentages();
        assert!((pcs[0].1 - 50.0).abs() < 1e-9);
        assert!(table.percent_text().starts_with("Kmer\tPercentage\nAAA\t50.0000\n"));
    }

    #[test]
    fn test_base_counts_top_and_bottom() {
        let mut table = KmerMotifStatistic::new(3);
        for m in ["ACG", "ACG", "TTT"] {
            table.add(m);
        }
        let top = table.base_counts(LogoSelection::Top(1));
        assert_eq!(top[0], vec![2, 0, 0]);
        assert_eq!(top[1], vec![0, 2, 0]);
        assert_eq!(top[2], vec![0, 0, 2]);
        assert_eq!(top[3], vec![0, 0, 0]);

        let bottom = table.base_counts(LogoSelection::Bottom(1));
        assert_eq!(bottom[3], vec![1, 1, 1]);

        // more requested than available uses everything
        let all = table.base_counts(LogoSelection::Top(10));
        assert_eq!(all[3], vec![1, 1, 1]);
        assert_eq!(all[0], vec![2, 0, 0]);
    }
}
