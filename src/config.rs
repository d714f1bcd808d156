//src/config.rs

use rand::rngs::StdRng;
use rand::SeedableRng;

/// On-disk layout produced by an aligner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    Maf,
    Sam,
}

/// External aligner whose output is being profiled.
///
/// Only the command line differs between most of these; decoding is shared per
/// `AlignmentFormat`, with a couple of name tweaks handled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aligner {
    #[default]
    Last,
    Bwa,
    Minimap2,
    GraphMap,
    Blasr,
    Ngmlr,
    MarginAlign,
}

impl Aligner {
    pub fn format(&self) -> AlignmentFormat {
        match self {
            Aligner::Last => AlignmentFormat::Maf,
            _ => AlignmentFormat::Sam,
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self.format() {
            AlignmentFormat::Maf => ".maf",
            AlignmentFormat::Sam => ".sam",
        }
    }

    /// Normalise a SAM QNAME to the read ID used elsewhere.
    /// BLASR appends `/<subread coordinates>` to every name.
    pub fn query_name<'a>(&self, qname: &'a str) -> &'a str {
        match self {
            Aligner::Blasr => qname.rsplit_once('/').map(|(id, _)| id).unwrap_or(qname),
            _ => qname,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "last" => Some(Aligner::Last),
            "bwa" => Some(Aligner::Bwa),
            "minimap2" => Some(Aligner::Minimap2),
            "graphmap" => Some(Aligner::GraphMap),
            "blasr" => Some(Aligner::Blasr),
            "ngmlr" => Some(Aligner::Ngmlr),
            "marginalign" => Some(Aligner::MarginAlign),
            _ => None,
        }
    }
}

/// How ties for the top fragment score are broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Always take the first fragment in score order.
    Fixed,
    /// Draw from the process RNG.
    #[default]
    Random,
    /// Reproducible draws: task `i` gets an RNG seeded with `seed + i`.
    Seeded(u64),
}

impl TieBreak {
    /// RNG for one file's task, or `None` when ties are resolved deterministically.
    pub fn rng_for_task(&self, task: usize) -> Option<StdRng> {
        match *self {
            TieBreak::Fixed => None,
            TieBreak::Random => Some(StdRng::from_rng(&mut rand::rng())),
            TieBreak::Seeded(seed) => Some(StdRng::seed_from_u64(seed.wrapping_add(task as u64))),
        }
    }
}

/// Nanopore read type; every reference keeps separate stats per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadType {
    #[default]
    Template,
    Complement,
    TwoD,
}

impl ReadType {
    pub const ALL: [ReadType; 3] = [ReadType::Template, ReadType::Complement, ReadType::TwoD];

    pub fn index(&self) -> usize {
        match self {
            ReadType::Template => 0,
            ReadType::Complement => 1,
            ReadType::TwoD => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReadType::Template => "Template",
            ReadType::Complement => "Complement",
            ReadType::TwoD => "2D",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "template" => Some(ReadType::Template),
            "complement" => Some(ReadType::Complement),
            "2d" => Some(ReadType::TwoD),
            _ => None,
        }
    }
}

/// Basecaller pass/fail bucket the alignment files came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadCategory {
    Pass,
    Fail,
    #[default]
    Unknown,
}

impl ReadCategory {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pass" => Some(ReadCategory::Pass),
            "fail" => Some(ReadCategory::Fail),
            _ => None,
        }
    }
}

/// Options for one profiling run.
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    pub aligner: Aligner,
    pub tie_break: TieBreak,
    pub read_type: ReadType,
    pub read_category: ReadCategory,
    /// Worker threads; `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Abort the batch on the first file that fails instead of skipping it.
    pub fail_fast: bool,
    /// How many motifs feed the top/bottom base-count matrices.
    pub logo_motifs: usize,
    /// Coverage bin width for reports; `None` picks one from the reference size.
    pub coverage_bin_size: Option<usize>,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            aligner: Aligner::default(),
            tie_break: TieBreak::default(),
            read_type: ReadType::default(),
            read_category: ReadCategory::default(),
            threads: None,
            fail_fast: false,
            logo_motifs: 10,
            coverage_bin_size: None,
        }
    }
}
