use std::fs;
use std::path::{Path, PathBuf};

use nanook_rs::stats::MOTIF_SIZES;
use nanook_rs::types::EventKind;
use nanook_rs::{
    analyse_alignments, find_alignment_files, profile_alignment_files, Aligner, ProfileOptions,
    ReadType, ReferenceRegistry, TieBreak,
};

const CHR1: &str = "GATTACAGATTACACCGGTTAACCGGTTAAGGCCTTAAGGCCTTAAACGTACGTACGTTTGCA";
const CHR2: &str = "CCCCCCCCCCGGGGGGGGGGAAAAAAAAAATTTTTTTTTT";

fn write_reference(dir: &Path) -> PathBuf {
    let path = dir.join("ref.fasta");
    fs::write(
        &path,
        format!(">chr1 test\n{}\n{}\n>chr2\n{}\n", &CHR1[..30], &CHR1[30..], CHR2),
    )
    .unwrap();
    path
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn options(aligner: Aligner) -> ProfileOptions {
    ProfileOptions {
        aligner,
        tie_break: TieBreak::Fixed,
        threads: Some(2),
        ..Default::default()
    }
}

#[test]
fn test_maf_run_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_reference(dir.path());
    let reads = dir.path().join("reads");
    fs::create_dir(&reads).unwrap();

    // two overlapping blocks against chr1, a weaker one against chr2
    write(
        &reads,
        "read1.maf",
        "a score=60\n\
         s chr1 0 14 + 63 GATTACAGATTACA\n\
         s read1 0 14 + 30 GATTACAGCTTACA\n\
         \n\
         a score=40\n\
         s chr1 10 12 + 63 TACACCG-GTTAA\n\
         s read1 10 13 + 30 TACACCGTGTTAA\n\
         \n\
         a score=10\n\
         s chr2 0 5 + 40 CCCCC\n\
         s read1 25 5 + 30 CCCCC\n",
    );
    write(&reads, "read2.maf", "# no alignments\n");
    write(&reads, "notes.txt", "ignored\n");

    let files = find_alignment_files(&reads, Aligner::Last).unwrap();
    assert_eq!(files.len(), 2);

    let analysis = analyse_alignments(&reference, &files, options(Aligner::Last)).unwrap();
    let results = &analysis.results;
    assert!(results.failures.is_empty());
    assert_eq!(results.read_set.reads_with_alignments, 1);
    assert_eq!(results.read_set.reads_without_alignments, 1);

    let text = analysis.get_alignments_text();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Filename\tQueryName"));
    let row: Vec<_> = lines[1].split('\t').collect();
    assert_eq!(row[0], "read1.maf");
    assert_eq!(row[6], "chr1");
    // 14 columns from the first block, 9 new ones from the second
    assert_eq!(row[11], "23");
    assert_eq!(lines[2], "read2.maf\tNO ALIGNMENTS");

    let errors = results.read_set.errors();
    assert_eq!(errors.substitution_count, 1);
    assert_eq!(errors.insertion_count, 1);
    assert_eq!(errors.substitution(b'A', b'C'), 1);
    assert_eq!(errors.motifs().get(EventKind::Substitution, 5).unwrap().count("TACAG"), 1);
    assert!(MOTIF_SIZES.iter().all(|&k| errors.motifs().total(EventKind::Deletion, k) == 0));

    let chr1 = analysis.references.resolve("chr1").unwrap();
    {
        let stats = chr1.stats(ReadType::Template);
        assert_eq!(stats.reads_with_alignments(), 1);
        assert_eq!(stats.coverage()[0], 1);
        assert_eq!(stats.coverage()[13], 1);
        assert_eq!(stats.coverage()[21], 1);
        assert_eq!(stats.coverage()[22], 0);
    }
    let chr2 = analysis.references.resolve("chr2").unwrap();
    assert_eq!(chr2.stats(ReadType::Template).reads_with_alignments(), 0);

    let out = dir.path().join("out");
    let written = analysis.write_reports(&out).unwrap();
    assert_eq!(written, analysis.reports().len());
    assert!(out.join("all_Template_alignments.txt").exists());
    assert!(out.join("all_Template_kmers.txt").exists());
    assert!(out.join("chr1/chr1_Template_coverage.txt").exists());
    assert!(!out.join("chr2").exists());
    let summary = fs::read_to_string(out.join("all_Template_reference_summary.txt")).unwrap();
    assert!(summary.lines().nth(1).unwrap().starts_with("chr1 63"));
}

#[test]
fn test_sam_run_with_shared_reference() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_reference(dir.path());
    let references = ReferenceRegistry::from_fasta(&reference).unwrap();

    let sam_header = "@SQ\tSN:chr1\tLN:63\n@SQ\tSN:chr2\tLN:40\n@PG\tID:minimap2\n";
    let files: Vec<PathBuf> = (0..6)
        .map(|i| {
            write(
                dir.path(),
                &format!("read{}.sam", i),
                &format!(
                    "{}read{}\t0\tchr2\t11\t60\t3S10M\t*\t0\t0\tAAAGGGGGGGGGG\t*\n",
                    sam_header, i
                ),
            )
        })
        .collect();

    let results = profile_alignment_files(&files, &references, &options(Aligner::Minimap2)).unwrap();
    assert_eq!(results.read_set.reads_with_alignments, 6);
    assert_eq!(results.alignments.len(), 6);

    let stats = references.resolve("chr2").unwrap().stats(ReadType::Template);
    assert_eq!(stats.reads_with_alignments(), 6);
    assert_eq!(stats.coverage()[10], 6);
    assert_eq!(stats.coverage()[19], 6);
    assert_eq!(stats.coverage()[20], 0);
    assert_eq!(stats.longest_perfect_kmer(), 10);

    let kmers = results.read_set.kmers_text();
    assert_eq!(kmers.lines().count(), 7);
    assert!(kmers.lines().nth(1).unwrap().starts_with("read0\t13\t"));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<PathBuf> = (0..8)
        .map(|i| {
            write(
                dir.path(),
                &format!("read{}.maf", i),
                &format!(
                    "a score=20\ns chr1 0 4 + 63 GATT\ns r{i} 0 4 + 10 GATT\n\n\
                     a score=20\ns chr2 0 4 + 40 CCCC\ns r{i} 0 4 + 10 CCCC\n"
                ),
            )
        })
        .collect();

    let hits = |seed: u64| -> Vec<String> {
        let references = ReferenceRegistry::from_sequences([("chr1", CHR1), ("chr2", CHR2)]);
        let opts = ProfileOptions {
            tie_break: TieBreak::Seeded(seed),
            threads: Some(4),
            ..Default::default()
        };
        let results = profile_alignment_files(&files, &references, &opts).unwrap();
        results
            .alignments
            .get_text()
            .lines()
            .skip(1)
            .map(|l| l.split('\t').nth(6).unwrap().to_string())
            .collect()
    };

    let first = hits(99);
    assert_eq!(first.len(), 8);
    assert!(first.iter().all(|h| h == "chr1" || h == "chr2"));
    assert_eq!(first, hits(99));
}
