//src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning aligner output into fragments.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("unrecognised CIGAR operation '{op}' at line {line}")]
    BadCigarOp { op: char, line: usize },

    #[error("invalid {field} '{value}' at line {line}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        line: usize,
    },

    #[error("reference '{name}' at line {line} is not in the reference set")]
    UnknownReference { name: String, line: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn malformed<S: Into<String>>(line: usize, reason: S) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

/// Everything that can abort the profiling of one alignment file.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to parse {file}: {source}")]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("unknown reference sequence '{0}'")]
    UnknownReference(String),

    #[error("{what} position {position} outside of [0, {limit})")]
    PositionOutOfRange {
        what: &'static str,
        position: usize,
        limit: usize,
    },

    #[error("fragment for query '{found}' merged into alignment of '{expected}'")]
    QueryMismatch { expected: String, found: String },

    #[error("fragment against '{found}' merged into alignment against '{expected}'")]
    HitMismatch { expected: String, found: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProfileError {
    pub fn out_of_range(what: &'static str, position: usize, limit: usize) -> Self {
        Self::PositionOutOfRange {
            what,
            position,
            limit,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
