//src/references.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use flate2::read::MultiGzDecoder;
use parking_lot::{Mutex, MutexGuard};

use crate::config::ReadType;
use crate::error::{ProfileError, Result};
use crate::stats::ReferenceSequenceStats;

/// One reference sequence plus its long-lived, per-read-type statistics.
pub struct ReferenceSequence {
    pub id: String,
    seq: String,
    stats: [Mutex<ReferenceSequenceStats>; 3],
}

impl ReferenceSequence {
    pub fn new(id: &str, seq: &str) -> Self {
        let seq = seq.to_ascii_uppercase();
        let size = seq.len();
        Self {
            id: id.to_string(),
            stats: ReadType::ALL.map(|_| Mutex::new(ReferenceSequenceStats::new(id, size))),
            seq,
        }
    }

    pub fn size(&self) -> usize {
        self.seq.len()
    }

    /// `len` bases starting at 0-based `start`; errors instead of clamping.
    pub fn substring(&self, start: usize, len: usize) -> Result<&str> {
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.seq.len())
            .ok_or_else(|| {
                ProfileError::out_of_range("reference end", start.saturating_add(len), self.seq.len() + 1)
            })?;
        Ok(&self.seq[start..end])
    }

    /// Lock the stats for one read type. Hold the guard only for a single update.
    pub fn stats(&self, read_type: ReadType) -> MutexGuard<'_, ReferenceSequenceStats> {
        self.stats[read_type.index()].lock()
    }
}

/// Resolves hit IDs to reference sequences.
#[derive(Default)]
pub struct ReferenceRegistry {
    by_id: AHashMap<String, Arc<ReferenceSequence>>,
    order: Vec<String>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from in-memory `(id, sequence)` pairs.
    pub fn from_sequences<'a, I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = Self::new();
        for (id, seq) in sequences {
            registry.insert(id, seq);
        }
        registry
    }

    /// Load a multi-FASTA, transparently handling `.gz`.
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path)?;
        let is_gz = path
            .extension()
            .map(|ext| ext == "gz")
            .unwrap_or(false);

        let reader: Box<dyn BufRead> = if is_gz {
            Box::new(BufReader::new(MultiGzDecoder::new(f)))
        } else {
            Box::new(BufReader::new(f))
        };

        let mut registry = Self::new();
        let mut current_id: Option<String> = None;
        let mut current_seq = String::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end();
            if let Some(header) = line.strip_prefix('>') {
                if let Some(id) = current_id.take() {
                    registry.insert(&id, &current_seq);
                }
                current_seq.clear();
                current_id = Some(header.split_whitespace().next().unwrap_or("").to_string());
            } else if current_id.is_some() {
                current_seq.push_str(line.trim());
            }
        }
        if let Some(id) = current_id {
            registry.insert(&id, &current_seq);
        }

        log::info!(
            "Loaded {} reference sequences from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    fn insert(&mut self, id: &str, seq: &str) {
        if self.by_id.contains_key(id) {
            log::warn!("Reference {} already seen, keeping the first copy", id);
            return;
        }
        self.order.push(id.to_string());
        self.by_id
            .insert(id.to_string(), Arc::new(ReferenceSequence::new(id, seq)));
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ReferenceSequence>> {
        self.by_id.get(id)
    }

    /// Like `get`, but a missing reference is an error.
    pub fn resolve(&self, id: &str) -> Result<&Arc<ReferenceSequence>> {
        self.get(id)
            .ok_or_else(|| ProfileError::UnknownReference(id.to_string()))
    }

    /// References in the order they were loaded.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ReferenceSequence>> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_substring_bounds() {
        let r = ReferenceSequence::new("chr1", "acgtacgt");
        assert_eq!(r.substring(2, 3).unwrap(), "GTA");
        assert_eq!(r.substring(0, 8).unwrap(), "ACGTACGT");
        assert!(matches!(
            r.substring(6, 4),
            Err(ProfileError::PositionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_resolve_unknown_reference() {
        let registry = ReferenceRegistry::from_sequences([("chr1", "ACGT")]);
        assert_eq!(registry.resolve("chr1").unwrap().size(), 4);
        assert!(matches!(
            registry.resolve("chr2"),
            Err(ProfileError::UnknownReference(id)) if id == "chr2"
        ));
    }

    #[test]
    fn test_from_fasta_multi_line() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, ">chr1 some description").unwrap();
        writeln!(f, "ACGT").unwrap();
        writeln!(f, "TTGG").unwrap();
        writeln!(f, ">chr2").unwrap();
        writeln!(f, "AAAA").unwrap();
        f.flush().unwrap();

        let registry = ReferenceRegistry::from_fasta(f.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("chr1").unwrap().substring(0, 8).unwrap(), "ACGTTTGG");
        let ids: Vec<_> = registry.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["chr1", "chr2"]);
    }
}
