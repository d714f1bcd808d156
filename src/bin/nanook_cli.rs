use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::path::{Path, PathBuf};

use nanook_rs::{
    analyse_alignments, find_alignment_files, Aligner, ProfileOptions, ReadCategory, ReadType,
    TieBreak,
};

#[derive(Parser, Debug)]
#[command(name = "nanook-rs", version, about = "Merge per-read alignments and profile their errors")]
struct Cli {
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(help = "Reference FASTA (optionally gzipped)")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_path_exists)]
    reference: PathBuf,

    #[clap(short = 'a')]
    #[clap(long = "alignments")]
    #[clap(help = "Directory holding one alignment file per read")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_path_exists)]
    alignments: PathBuf,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Directory the reports are written to")]
    #[clap(value_name = "DIR")]
    output: PathBuf,

    #[clap(long = "aligner")]
    #[clap(help = "Aligner that produced the files: last, bwa, minimap2, graphmap, blasr, ngmlr, marginalign")]
    #[clap(default_value = "last")]
    #[arg(value_parser = parse_aligner)]
    aligner: Aligner,

    #[clap(long = "read-type")]
    #[clap(help = "Read type the files hold: template, complement or 2d")]
    #[clap(default_value = "template")]
    #[arg(value_parser = parse_read_type)]
    read_type: ReadType,

    #[clap(long = "category")]
    #[clap(help = "Basecaller bucket the files came from: pass or fail")]
    #[arg(value_parser = parse_category)]
    category: Option<ReadCategory>,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of worker threads (default: all cores)")]
    threads: Option<usize>,

    #[clap(long = "fix-random")]
    #[clap(help = "Always pick the first of equally scoring alignments")]
    #[clap(conflicts_with = "seed")]
    fix_random: bool,

    #[clap(long = "seed")]
    #[clap(help = "Seed for reproducible tie-breaking between equally scoring alignments")]
    seed: Option<u64>,

    #[clap(long = "fail-fast")]
    #[clap(help = "Stop at the first file that cannot be profiled")]
    fail_fast: bool,

    #[clap(long = "logo-motifs")]
    #[clap(help = "Number of top/bottom motifs used for base-count matrices")]
    #[clap(default_value_t = 10)]
    logo_motifs: usize,

    #[clap(long = "bin-size")]
    #[clap(help = "Coverage bin size (default: derived from reference size)")]
    bin_size: Option<usize>,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    verbosity: u8,
}

impl Cli {
    fn options(&self) -> ProfileOptions {
        let tie_break = match (self.fix_random, self.seed) {
            (true, _) => TieBreak::Fixed,
            (false, Some(seed)) => TieBreak::Seeded(seed),
            (false, None) => TieBreak::Random,
        };
        ProfileOptions {
            aligner: self.aligner,
            tie_break,
            read_type: self.read_type,
            read_category: self.category.unwrap_or_default(),
            threads: self.threads,
            fail_fast: self.fail_fast,
            logo_motifs: self.logo_motifs,
            coverage_bin_size: self.bin_size,
        }
    }
}

fn check_path_exists(s: &str) -> Result<PathBuf, String> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("Path does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn parse_aligner(s: &str) -> Result<Aligner, String> {
    Aligner::from_name(s).ok_or_else(|| format!("Unknown aligner: {}", s))
}

fn parse_read_type(s: &str) -> Result<ReadType, String> {
    ReadType::from_name(s).ok_or_else(|| format!("Unknown read type: {}", s))
}

fn parse_category(s: &str) -> Result<ReadCategory, String> {
    ReadCategory::from_name(s).ok_or_else(|| format!("Unknown read category: {}", s))
}

fn init_verbose(args: &Cli) {
    let filter_level = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(filter_level)
        .parse_default_env()
        .init();
}

fn spinner(color: &str, message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template(&format!("{{spinner:.{}}} {{msg}}", color))?,
    );
    spinner.set_message(message.to_string());
    Ok(spinner)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.options();

    // 1. Gather alignment files
    let sp = spinner(
        "blue",
        &format!("Gathering {} files under {}...", options.aligner.file_extension(), cli.alignments.display()),
    )?;
    let files = find_alignment_files(&cli.alignments, options.aligner)?;
    sp.finish_with_message(format!("Found {} alignment file(s).", files.len()));

    // 2. Merge and profile
    let sp = spinner("green", "Profiling alignments...")?;
    let analysis = analyse_alignments(&cli.reference, &files, options)?;
    let read_set = &analysis.results.read_set;
    sp.finish_with_message(format!(
        "Profiled {} reads: {} with alignments, {} without, {} failed.",
        read_set.reads(),
        read_set.reads_with_alignments,
        read_set.reads_without_alignments,
        analysis.results.failures.len()
    ));

    // 3. Write reports
    let sp = spinner("yellow", "Writing reports...")?;
    let written = analysis.write_reports(&cli.output)?;
    sp.finish_with_message(format!("Wrote {} report(s) to {}.", written, cli.output.display()));

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_verbose(&cli);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
