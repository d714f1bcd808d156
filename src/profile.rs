// src/profile.rs

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::alignments_table::AlignmentsTable;
use crate::config::ProfileOptions;
use crate::error::{ProfileError, Result};
use crate::merge::{merge_fragments, select_fragments, ReadProfile};
use crate::parsers::read_alignment_file;
use crate::references::ReferenceRegistry;
use crate::stats::ReadSetStats;
use crate::types::AlignmentTableRow;

/// What profiling a single alignment file produced.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Merged { filename: String, profile: ReadProfile },
    NoAlignments { filename: String },
}

/// A file that could not be profiled and was skipped.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ProfileError,
}

/// Everything a batch run produces apart from the per-reference stats,
/// which stay on the `ReferenceRegistry`.
#[derive(Debug, Default)]
pub struct ProfileResults {
    pub alignments: AlignmentsTable,
    pub read_set: ReadSetStats,
    pub failures: Vec<FileFailure>,
}

impl ProfileResults {
    pub fn get_alignments_text(&self) -> String {
        self.alignments.get_text()
    }

    pub fn get_kmers_text(&self) -> String {
        self.read_set.kmers_text()
    }

    /// `path\terror` for each skipped file.
    pub fn get_failures_text(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}\t{}\n", f.path.display(), f.error))
            .collect()
    }
}

fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse, select, merge and record one read's alignment file.
///
/// `task` is the file's position in the batch; it seeds the tie-break RNG
/// when a seeded strategy is configured.
pub fn profile_alignment_file(
    path: &Path,
    task: usize,
    references: &ReferenceRegistry,
    options: &ProfileOptions,
) -> Result<FileOutcome> {
    let filename = leaf_name(path);
    let fragments = read_alignment_file(path, options.aligner, references)?;

    let mut rng = options.tie_break.rng_for_task(task);
    let Some(selection) = select_fragments(fragments, rng.as_mut()) else {
        log::debug!("{}: no alignments", filename);
        return Ok(FileOutcome::NoAlignments { filename });
    };

    let reference = references.resolve(&selection.canonical_hit)?;
    let profile = merge_fragments(&selection.fragments, selection.read_length)?;
    reference.stats(options.read_type).record_read(&profile)?;

    log::debug!(
        "{}: {} fragments merged against {}, {} identical of {} aligned",
        filename,
        selection.fragments.len(),
        selection.canonical_hit,
        profile.summary.identical_bases,
        profile.summary.alignment_size
    );
    Ok(FileOutcome::Merged { filename, profile })
}

/// Per-thread partial results.
#[derive(Default)]
struct BatchAccumulator {
    rows: Vec<(usize, AlignmentTableRow)>,
    read_set: ReadSetStats,
    failures: Vec<(usize, FileFailure)>,
}

impl BatchAccumulator {
    fn record(&mut self, task: usize, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Merged { filename, profile } => {
                self.read_set.add_read_with_alignment(&profile);
                self.rows.push((
                    task,
                    AlignmentTableRow::Merged {
                        filename,
                        summary: profile.summary,
                    },
                ));
            }
            FileOutcome::NoAlignments { filename } => {
                self.read_set.add_read_without_alignment();
                self.rows.push((task, AlignmentTableRow::NoAlignments { filename }));
            }
        }
    }

    fn merge(mut self, mut other: BatchAccumulator) -> BatchAccumulator {
        self.rows.append(&mut other.rows);
        self.failures.append(&mut other.failures);
        self.read_set.merge(other.read_set);
        self
    }
}

/// Profile a batch of alignment files, one read per file, in parallel.
///
/// Per-reference stats are updated in place on `references`. A file that
/// fails is logged and reported in `ProfileResults::failures`, unless
/// `fail_fast` is set, in which case the first failure aborts the batch.
pub fn profile_alignment_files<P>(
    files: &[P],
    references: &ReferenceRegistry,
    options: &ProfileOptions,
) -> Result<ProfileResults>
where
    P: AsRef<Path> + Sync,
{
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = options.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|e| ProfileError::Io(std::io::Error::other(e)))?;

    log::info!(
        "Profiling {} alignment files ({:?}, {} reads) on {} threads",
        files.len(),
        options.aligner,
        options.read_type.name(),
        pool.current_num_threads()
    );

    let acc = pool.install(|| {
        files
            .par_iter()
            .enumerate()
            .try_fold(BatchAccumulator::default, |mut acc, (task, path)| {
                let path = path.as_ref();
                acc.read_set.add_read_file(options.read_category);
                match profile_alignment_file(path, task, references, options) {
                    Ok(outcome) => acc.record(task, outcome),
                    Err(error) if options.fail_fast => {
                        log::error!("Failed to profile {}: {}", path.display(), error);
                        return Err(error);
                    }
                    Err(error) => {
                        log::warn!("Skipping {}: {}", path.display(), error);
                        acc.read_set.add_failed_file();
                        acc.failures.push((
                            task,
                            FileFailure {
                                path: path.to_path_buf(),
                                error,
                            },
                        ));
                    }
                }
                Ok(acc)
            })
            .try_reduce(BatchAccumulator::default, |a, b| Ok(a.merge(b)))
    })?;

    let BatchAccumulator {
        mut rows,
        mut read_set,
        mut failures,
    } = acc;
    rows.sort_by_key(|(task, _)| *task);
    failures.sort_by_key(|(task, _)| *task);
    read_set.sort_kmer_rows();

    log::info!(
        "{} reads with alignments, {} without, {} files failed",
        read_set.reads_with_alignments,
        read_set.reads_without_alignments,
        failures.len()
    );

    Ok(ProfileResults {
        alignments: AlignmentsTable::new(rows.into_iter().map(|(_, row)| row).collect()),
        read_set,
        failures: failures.into_iter().map(|(_, f)| f).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Aligner, TieBreak};
    use crate::error::ParseError;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn registry() -> ReferenceRegistry {
        ReferenceRegistry::from_sequences([
            ("chr1", "ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT"),
            ("chr2", "TTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTTT"),
        ])
    }

    #[test]
    fn test_single_file_merged_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "read1.maf",
            "a score=50\ns chr1 4 8 + 40 ACGTACGT\ns read1 0 8 + 20 ACGTACCT\n",
        );
        let references = registry();
        let options = ProfileOptions {
            tie_break: TieBreak::Fixed,
            ..Default::default()
        };
        match profile_alignment_file(&path, 0, &references, &options).unwrap() {
            FileOutcome::Merged { filename, profile } => {
                assert_eq!(filename, "read1.maf");
                assert_eq!(profile.summary.identical_bases, 7);
                assert_eq!(profile.summary.query_size, 20);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let stats = references.resolve("chr1").unwrap().stats(options.read_type);
        assert_eq!(stats.reads_with_alignments(), 1);
        assert_eq!(stats.coverage()[4], 1);
        assert_eq!(stats.coverage()[12], 0);
    }

    #[test]
    fn test_unknown_reference_fails_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "read1.maf",
            "a score=50\ns chrX 0 4 + 40 ACGT\ns read1 0 4 + 20 ACGT\n",
        );
        assert!(matches!(
            profile_alignment_file(&path, 0, &registry(), &ProfileOptions::default()),
            Err(ProfileError::UnknownReference(_))
        ));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(dir.path(), "a.maf", "a score=9\ns chr2 0 4 + 40 TTTT\ns a 0 4 - 10 TTTT\n"),
            write(dir.path(), "b.maf", "a score=9\ns chr2 0 4 + 40\n"),
            write(dir.path(), "c.maf", "# nothing\n"),
        ];
        let references = registry();
        let options = ProfileOptions {
            aligner: Aligner::Last,
            threads: Some(2),
            ..Default::default()
        };
        let results = profile_alignment_files(&files, &references, &options).unwrap();

        assert_eq!(results.failures.len(), 1);
        assert_eq!(results.failures[0].path, files[1]);
        assert_eq!(results.read_set.files_processed, 3);
        assert_eq!(results.read_set.reads_with_alignments, 1);
        assert_eq!(results.read_set.reads_without_alignments, 1);
        assert_eq!(results.read_set.failed_files, 1);

        let names: Vec<_> = results.alignments.rows().iter().map(|r| r.filename()).collect();
        assert_eq!(names, vec!["a.maf", "c.maf"]);
        assert!(results.get_alignments_text().contains("c.maf\tNO ALIGNMENTS"));
        assert!(results.get_failures_text().starts_with(&files[1].display().to_string()));
    }

    #[test]
    fn test_overflowing_cigar_fails_only_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let header = "@SQ\tSN:chr1\tLN:40\n";
        let files = vec![
            write(
                dir.path(),
                "bad.sam",
                &format!("{}bad\t0\tchr1\t1\t60\t1M18446744073709551615M\t*\t0\t0\tACGT\t*\n", header),
            ),
            write(
                dir.path(),
                "good.sam",
                &format!("{}good\t0\tchr1\t1\t60\t4M\t*\t0\t0\tACGT\t*\n", header),
            ),
        ];
        let references = registry();
        let options = ProfileOptions {
            aligner: Aligner::Minimap2,
            threads: Some(2),
            ..Default::default()
        };
        let results = profile_alignment_files(&files, &references, &options).unwrap();

        assert_eq!(results.failures.len(), 1);
        assert_eq!(results.failures[0].path, files[0]);
        assert!(matches!(
            results.failures[0].error,
            ProfileError::Parse {
                source: ParseError::InvalidNumber { .. },
                ..
            }
        ));
        assert_eq!(results.read_set.reads_with_alignments, 1);
        let names: Vec<_> = results.alignments.rows().iter().map(|r| r.filename()).collect();
        assert_eq!(names, vec!["good.sam"]);
    }

    #[test]
    fn test_fail_fast_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![write(dir.path(), "bad.maf", "a score=x\n")];
        let options = ProfileOptions {
            fail_fast: true,
            ..Default::default()
        };
        assert!(matches!(
            profile_alignment_files(&files, &registry(), &options),
            Err(ProfileError::Parse { .. })
        ));
    }
}
